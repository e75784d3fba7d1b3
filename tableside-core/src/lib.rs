//! Tableside Core — order composition engine for front-of-house ordering.
//!
//! This crate contains the in-memory order builder:
//! - Domain types (menu item snapshots, cart lines, identity keys)
//! - The cart with merge-on-write and quantity-driven split/merge of lines
//! - Derived kitchen notes and totals
//! - Menu catalog loading and category lookup for display grouping
//! - Submission payloads for the order service
//!
//! Everything here is synchronous and owned by a single session; nothing
//! talks to the network.

pub mod cart;
pub mod catalog;
pub mod domain;
pub mod note;
pub mod submission;

pub use cart::{Cart, CartError, CategoryGroup};
pub use catalog::{Catalog, CatalogError, Category, CategoryLookup, CategoryRef};
pub use domain::{
    CartLine, CategoryId, Ingredient, LineKey, LineKeyError, MenuItemId, MenuItemRef, StaffId,
    TableId,
};
pub use submission::{OrderItemPayload, OrderSubmission};
