//! End-to-end cart scenarios driven from a TOML menu.
//!
//! Tests:
//! 1. Split then remerge on a two-unit burger line, with totals
//! 2. Unavailable items and empty carts are rejected
//! 3. Category grouping against the catalog lookup
//! 4. Submission payload JSON shape

use rust_decimal_macros::dec;
use tableside_core::{Cart, CartError, Catalog, LineKey, MenuItemId, StaffId, TableId};

const MENU: &str = r#"
[[categories]]
id = 1
name = "Mains"
display_order = 2

[[categories]]
id = 2
name = "Starters"
display_order = 1

[[items]]
id = 1
name = "Burger"
category_id = 1
unit_price = "10.00"
ingredients = [
  { name = "Patty" },
  { name = "Cheese", removable = true },
  { name = "Pickles", removable = true },
]

[[items]]
id = 2
name = "Soup"
category_id = 2
unit_price = "6.50"

[[items]]
id = 3
name = "Oysters"
category_id = 2
unit_price = "18.00"
is_available = false
"#;

fn catalog() -> Catalog {
    Catalog::from_toml(MENU).unwrap()
}

fn key(s: &str) -> LineKey {
    s.parse().unwrap()
}

fn lines(cart: &Cart) -> Vec<(String, u32)> {
    cart.iter()
        .map(|l| (l.key().to_string(), l.quantity()))
        .collect()
}

#[test]
fn split_then_remerge_burger() {
    let catalog = catalog();
    let burger = catalog.item(MenuItemId(1)).unwrap();
    let mut cart = Cart::new();

    cart.add_item(burger).unwrap();
    cart.add_item(burger).unwrap();
    assert_eq!(lines(&cart), vec![("1::".to_string(), 2)]);

    cart.exclude_ingredient(&key("1::"), "Cheese");
    assert_eq!(
        lines(&cart),
        vec![("1::".to_string(), 1), ("1::Cheese".to_string(), 1)]
    );
    assert_eq!(cart.compute_total(), dec!(20.00));

    cart.include_ingredient(&key("1::Cheese"), "Cheese");
    assert_eq!(lines(&cart), vec![("1::".to_string(), 2)]);
    assert_eq!(cart.compute_total(), dec!(20.00));
}

#[test]
fn fixed_ingredients_cannot_be_excluded() {
    let catalog = catalog();
    let mut cart = Cart::new();
    cart.add_item(catalog.item(MenuItemId(1)).unwrap()).unwrap();

    assert_eq!(cart.exclude_ingredient(&key("1::"), "Patty"), None);
    assert_eq!(lines(&cart), vec![("1::".to_string(), 1)]);
}

#[test]
fn unavailable_item_leaves_cart_unchanged() {
    let catalog = catalog();
    let mut cart = Cart::new();
    cart.add_item(catalog.item(MenuItemId(2)).unwrap()).unwrap();

    let result = cart.add_item(catalog.item(MenuItemId(3)).unwrap());

    assert!(matches!(result, Err(CartError::ItemUnavailable { .. })));
    assert_eq!(lines(&cart), vec![("2::".to_string(), 1)]);
}

#[test]
fn empty_cart_is_not_submittable() {
    let cart = Cart::new();
    let err = cart
        .to_submission_payload(TableId(1), StaffId(1))
        .unwrap_err();
    assert_eq!(err, CartError::EmptyCart);
    assert_eq!(err.to_string(), "cannot submit an empty order");
}

#[test]
fn groups_follow_category_display_order() {
    let catalog = catalog();
    let mut cart = Cart::new();
    cart.add_item(catalog.item(MenuItemId(1)).unwrap()).unwrap();
    cart.add_item(catalog.item(MenuItemId(2)).unwrap()).unwrap();
    cart.add_item(catalog.item(MenuItemId(1)).unwrap()).unwrap();
    cart.exclude_ingredient(&key("1::"), "Pickles");

    let groups = cart.group_by_category(&catalog);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].category.as_ref().unwrap().name, "Starters");
    assert_eq!(groups[0].subtotal(), dec!(6.50));
    assert_eq!(groups[1].category.as_ref().unwrap().name, "Mains");
    let mains: Vec<String> = groups[1].lines.iter().map(|l| l.key().to_string()).collect();
    assert_eq!(mains, vec!["1::", "1::Pickles"]);
}

#[test]
fn payload_json_shape() {
    let catalog = catalog();
    let mut cart = Cart::new();
    let burger = catalog.item(MenuItemId(1)).unwrap();
    cart.add_item(burger).unwrap();
    let k = cart.exclude_ingredient(&key("1::"), "Pickles").unwrap();
    cart.exclude_ingredient(&k, "Cheese");
    cart.add_item(catalog.item(MenuItemId(2)).unwrap()).unwrap();

    let payload = cart.to_submission_payload(TableId(12), StaffId(3)).unwrap();
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "tableId": 12,
            "staffId": 3,
            "orderItems": [
                {
                    "menuItemId": 1,
                    "menuItemName": "Burger",
                    "quantity": 1,
                    "price": 10.0,
                    "specialInstructions": "without Cheese, without Pickles"
                },
                {
                    "menuItemId": 2,
                    "menuItemName": "Soup",
                    "quantity": 1,
                    "price": 6.5,
                    "specialInstructions": null
                }
            ]
        })
    );
    assert_eq!(payload.total(), cart.compute_total());
}
