//! Order submission payload sent to the order service.

use crate::domain::{MenuItemId, StaffId, TableId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One order line as the order service expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub menu_item_id: MenuItemId,
    pub menu_item_name: String,
    pub quantity: u32,
    /// Unit price captured when the item was added. Sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub special_instructions: Option<String>,
}

/// A finalized order for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub table_id: TableId,
    pub staff_id: StaffId,
    pub order_items: Vec<OrderItemPayload>,
}

impl OrderSubmission {
    /// Σ quantity × price over all items.
    pub fn total(&self) -> Decimal {
        self.order_items
            .iter()
            .map(|item| Decimal::from(item.quantity) * item.price)
            .sum()
    }

    /// Units across all items.
    pub fn item_count(&self) -> u64 {
        self.order_items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Deterministic content hash of the payload.
    ///
    /// Identical orders for the same table and staff member hash the same, so
    /// a retried submission can be recognized by the order service.
    pub fn fingerprint(&self) -> String {
        let items: Vec<serde_json::Value> = self
            .order_items
            .iter()
            .map(|item| {
                json!({
                    "menuItemId": item.menu_item_id.0,
                    "menuItemName": &item.menu_item_name,
                    "quantity": item.quantity,
                    "price": item.price.normalize().to_string(),
                    "specialInstructions": &item.special_instructions,
                })
            })
            .collect();

        // serde_json::Map is ordered by key, so the encoding is canonical
        let canonical = json!({
            "orderItems": items,
            "staffId": self.staff_id.0,
            "tableId": self.table_id.0,
        });

        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}
