use super::ids::{CategoryId, MenuItemId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One ingredient of a menu item, in recipe order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Whether a guest may ask for the item without it.
    #[serde(default)]
    pub removable: bool,
}

impl Ingredient {
    pub fn removable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            removable: true,
        }
    }

    pub fn fixed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            removable: false,
        }
    }
}

/// Read-only view of a catalog item, as handed to the cart.
///
/// The cart copies what it needs out of this at add time, so later catalog
/// edits never reach an in-progress order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemRef {
    pub id: MenuItemId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

fn default_available() -> bool {
    true
}

impl MenuItemRef {
    pub fn new(id: impl Into<MenuItemId>, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            is_available: true,
            category_id: None,
            ingredients: Vec::new(),
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }

    /// Names of the removable ingredients, in recipe order, without duplicates.
    /// Empty names are skipped; they cannot appear in a line key.
    pub fn removable_ingredient_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for ingredient in self
            .ingredients
            .iter()
            .filter(|i| i.removable && !i.name.is_empty())
        {
            if !names.contains(&ingredient.name) {
                names.push(ingredient.name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn removable_names_keep_recipe_order_and_skip_fixed() {
        let item = MenuItemRef::new(1, "Burger", dec!(10.00)).with_ingredients(vec![
            Ingredient::fixed("Bun"),
            Ingredient::removable("Pickles"),
            Ingredient::removable("Cheese"),
            Ingredient::removable("Pickles"),
        ]);

        assert_eq!(item.removable_ingredient_names(), vec!["Pickles", "Cheese"]);
    }

    #[test]
    fn builder_defaults_to_available_and_uncategorized() {
        let item = MenuItemRef::new(3, "Fries", dec!(3.50));
        assert!(item.is_available);
        assert_eq!(item.category_id, None);
        assert!(item.removable_ingredient_names().is_empty());
    }
}
