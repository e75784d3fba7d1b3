//! Cart lines and their identity keys.

use super::ids::MenuItemId;
use super::menu_item::MenuItemRef;
use crate::note::note_for;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the item id and the exclusion list in a key string.
pub const KEY_SEPARATOR: &str = "::";

/// Separator between excluded ingredient names in a key string.
pub const EXCLUSION_SEPARATOR: char = ',';

/// Escapes a literal separator or backslash inside an ingredient name.
pub const ESCAPE: char = '\\';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineKeyError {
    #[error("line key '{0}' is missing the '::' separator")]
    MissingSeparator(String),

    #[error("line key '{0}' does not start with a numeric menu item id")]
    InvalidItemId(String),

    #[error("line key '{0}' has an empty ingredient name")]
    EmptyIngredient(String),

    #[error("line key '{0}' has a backslash that escapes nothing")]
    InvalidEscape(String),
}

/// Identity of a cart line: the menu item plus its sorted exclusion set.
///
/// Two lines with equal keys never coexist in a cart. The canonical string
/// form is `<item id>::<sorted, comma-joined exclusions>`, e.g. `1::` or
/// `1::Cheese,Pickles`. Commas and backslashes inside a name are escaped with
/// a backslash (`1::Salt\, Pepper`), so every key parses back to itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    menu_item_id: MenuItemId,
    excluded: Vec<String>,
}

impl LineKey {
    /// Derive a key. Exclusion order does not matter; duplicates collapse.
    pub fn new<I, S>(menu_item_id: MenuItemId, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excluded: BTreeSet<String> = excluded.into_iter().map(Into::into).collect();
        Self {
            menu_item_id,
            excluded: excluded.into_iter().collect(),
        }
    }

    /// Key of an uncustomized line for `menu_item_id`.
    pub fn plain(menu_item_id: MenuItemId) -> Self {
        Self {
            menu_item_id,
            excluded: Vec::new(),
        }
    }

    pub fn menu_item_id(&self) -> MenuItemId {
        self.menu_item_id
    }

    /// Excluded ingredient names, sorted.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.menu_item_id, KEY_SEPARATOR)?;
        for (i, name) in self.excluded.iter().enumerate() {
            if i > 0 {
                write!(f, "{EXCLUSION_SEPARATOR}")?;
            }
            for ch in name.chars() {
                if ch == EXCLUSION_SEPARATOR || ch == ESCAPE {
                    write!(f, "{ESCAPE}")?;
                }
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for LineKey {
    type Err = LineKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, rest) = s
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| LineKeyError::MissingSeparator(s.to_string()))?;
        let id: u64 = id
            .trim()
            .parse()
            .map_err(|_| LineKeyError::InvalidItemId(s.to_string()))?;
        Ok(Self::new(MenuItemId(id), split_exclusions(s, rest)?))
    }
}

/// Split the exclusion part of `key` on unescaped separators. Names are taken
/// verbatim, whitespace included.
fn split_exclusions(key: &str, rest: &str) -> Result<Vec<String>, LineKeyError> {
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let mut current = String::new();
    let mut chars = rest.chars();
    while let Some(ch) = chars.next() {
        match ch {
            ESCAPE => match chars.next() {
                Some(escaped @ (EXCLUSION_SEPARATOR | ESCAPE)) => current.push(escaped),
                _ => return Err(LineKeyError::InvalidEscape(key.to_string())),
            },
            EXCLUSION_SEPARATOR => names.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    names.push(current);

    if names.iter().any(String::is_empty) {
        return Err(LineKeyError::EmptyIngredient(key.to_string()));
    }
    Ok(names)
}

impl Serialize for LineKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LineKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the cart: a quantity of one menu item under one customization.
///
/// Name, price and removable ingredients are copied from the catalog when
/// the line is created and never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub menu_item_id: MenuItemId,
    pub menu_item_name: String,
    pub unit_price: Decimal,
    pub(crate) quantity: u32,
    pub removable_ingredient_names: Vec<String>,
    pub(crate) excluded_ingredient_names: BTreeSet<String>,
}

impl CartLine {
    /// Fresh line for one uncustomized unit of `item`.
    pub fn from_menu_item(item: &MenuItemRef) -> Self {
        Self {
            menu_item_id: item.id,
            menu_item_name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: 1,
            removable_ingredient_names: item.removable_ingredient_names(),
            excluded_ingredient_names: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey {
            menu_item_id: self.menu_item_id,
            excluded: self.excluded_ingredient_names.iter().cloned().collect(),
        }
    }

    /// Key comparison without building a `LineKey`.
    pub fn has_key(&self, key: &LineKey) -> bool {
        self.menu_item_id == key.menu_item_id
            && self.excluded_ingredient_names.iter().eq(key.excluded.iter())
    }

    /// Always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Excluded ingredient names in sorted order.
    pub fn excluded_ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.excluded_ingredient_names.iter().map(String::as_str)
    }

    pub fn is_removable(&self, ingredient: &str) -> bool {
        self.removable_ingredient_names.iter().any(|n| n == ingredient)
    }

    pub fn is_excluded(&self, ingredient: &str) -> bool {
        self.excluded_ingredient_names.contains(ingredient)
    }

    /// "without X, without Y", or `None` when nothing is excluded.
    pub fn note(&self) -> Option<String> {
        note_for(&self.excluded_ingredient_names)
    }

    /// `quantity × unit_price`
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}
