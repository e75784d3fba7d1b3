//! Placed orders and their elapsed-time labels.
//!
//! The floor view refreshes these labels once per second; nothing here owns a
//! timer, callers pass `now` in.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tableside_core::{OrderSubmission, TableId};

/// An order the service has accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub table_id: TableId,
    /// Server-side id, when the service returned one.
    pub order_id: Option<u64>,
    /// Fingerprint of the submitted payload.
    pub fingerprint: String,
    pub placed_at: DateTime<Utc>,
    pub item_count: u64,
    pub total: Decimal,
}

impl PlacedOrder {
    pub fn from_submission(
        payload: &OrderSubmission,
        order_id: Option<u64>,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            table_id: payload.table_id,
            order_id,
            fingerprint: payload.fingerprint(),
            placed_at,
            item_count: payload.item_count(),
            total: payload.total(),
        }
    }

    pub fn elapsed_label(&self, now: DateTime<Utc>) -> String {
        elapsed_label(self.placed_at, now)
    }
}

/// "MM:SS" under an hour, "H:MM:SS" from then on.
///
/// A `now` earlier than `placed_at` (clock skew between terminals) reads as
/// "00:00".
pub fn elapsed_label(placed_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - placed_at).num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
