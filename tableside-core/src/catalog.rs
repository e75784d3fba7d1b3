//! Menu catalog — categories and items loaded from a TOML menu file.
//!
//! The catalog is read-only from the cart's point of view: it hands out
//! `MenuItemRef` snapshots and answers category lookups for display grouping.

use crate::domain::{CategoryId, MenuItemId, MenuItemRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read menu file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse menu TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate category id {0}")]
    DuplicateCategory(CategoryId),

    #[error("duplicate menu item id {0}")]
    DuplicateItem(MenuItemId),

    #[error("menu item {item} refers to unknown category {category}")]
    UnknownCategory {
        item: MenuItemId,
        category: CategoryId,
    },

    #[error("menu item {0} has a negative price")]
    NegativePrice(MenuItemId),

    #[error("menu item {item} has an ingredient with a blank or padded name: '{name}'")]
    InvalidIngredientName { item: MenuItemId, name: String },
}

/// Category header used when grouping cart lines for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub display_order: i32,
}

/// Resolves the category a menu item belongs to.
pub trait CategoryLookup {
    fn category_of(&self, menu_item_id: MenuItemId) -> Option<CategoryRef>;
}

impl<F> CategoryLookup for F
where
    F: Fn(MenuItemId) -> Option<CategoryRef>,
{
    fn category_of(&self, menu_item_id: MenuItemId) -> Option<CategoryRef> {
        self(menu_item_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
}

impl Category {
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            name: self.name.clone(),
            display_order: self.display_order,
        }
    }
}

/// The complete menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub items: Vec<MenuItemRef>,
}

impl Catalog {
    /// Load and validate a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a catalog from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: Self = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check id uniqueness, category references, prices and ingredient names.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut category_ids = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id) {
                return Err(CatalogError::DuplicateCategory(category.id));
            }
        }

        let mut item_ids = HashSet::new();
        for item in &self.items {
            if !item_ids.insert(item.id) {
                return Err(CatalogError::DuplicateItem(item.id));
            }
            if let Some(category) = item.category_id {
                if !category_ids.contains(&category) {
                    return Err(CatalogError::UnknownCategory {
                        item: item.id,
                        category,
                    });
                }
            }
            if item.unit_price < Decimal::ZERO {
                return Err(CatalogError::NegativePrice(item.id));
            }
            if let Some(bad) = item
                .ingredients
                .iter()
                .find(|i| i.name.is_empty() || i.name.trim() != i.name)
            {
                return Err(CatalogError::InvalidIngredientName {
                    item: item.id,
                    name: bad.name.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn item(&self, id: MenuItemId) -> Option<&MenuItemRef> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Categories sorted by display order, then id.
    pub fn categories_in_order(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.iter().collect();
        categories.sort_by_key(|c| (c.display_order, c.id));
        categories
    }

    /// Items of one category in menu file order.
    pub fn items_in(&self, category: CategoryId) -> Vec<&MenuItemRef> {
        self.items
            .iter()
            .filter(|item| item.category_id == Some(category))
            .collect()
    }

    /// Items without a category.
    pub fn uncategorized_items(&self) -> Vec<&MenuItemRef> {
        self.items
            .iter()
            .filter(|item| item.category_id.is_none())
            .collect()
    }

    /// Items a guest can order right now.
    pub fn available_items(&self) -> Vec<&MenuItemRef> {
        self.items.iter().filter(|item| item.is_available).collect()
    }
}

impl CategoryLookup for Catalog {
    fn category_of(&self, menu_item_id: MenuItemId) -> Option<CategoryRef> {
        let category_id = self.item(menu_item_id)?.category_id?;
        self.category(category_id).map(Category::to_ref)
    }
}
