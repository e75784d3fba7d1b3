//! Domain types: ids, menu item snapshots, cart lines.

pub mod ids;
pub mod line;
pub mod menu_item;

pub use ids::{CategoryId, MenuItemId, StaffId, TableId};
pub use line::{CartLine, LineKey, LineKeyError};
pub use menu_item::{Ingredient, MenuItemRef};
