//! Order session — one table, one cart, one submission at a time.
//!
//! A session moves between two states:
//! - `Composing`: the cart is editable
//! - `Submitting`: a payload is in flight; the cart is frozen and further
//!   submissions are refused
//!
//! On a confirmed submission the cart is cleared. On failure it is kept
//! exactly as it was so the order can be retried without re-entering items.

use crate::clock::PlacedOrder;
use crate::submitter::{OrderSubmitter, SubmissionReceipt, SubmitError};
use chrono::{DateTime, Utc};
use tableside_core::{Cart, OrderSubmission, StaffId, TableId};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Composing,
    Submitting,
}

/// Ordering session for a single table.
#[derive(Debug)]
pub struct OrderSession {
    table_id: TableId,
    staff_id: StaffId,
    cart: Cart,
    state: SessionState,
    in_flight: Option<OrderSubmission>,
}

impl OrderSession {
    /// Start a session with an empty cart.
    pub fn new(table_id: TableId, staff_id: StaffId) -> Self {
        Self {
            table_id,
            staff_id,
            cart: Cart::new(),
            state: SessionState::Composing,
            in_flight: None,
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn staff_id(&self) -> StaffId {
        self.staff_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SessionState::Submitting
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Mutable cart access, only while composing.
    pub fn cart_mut(&mut self) -> Option<&mut Cart> {
        match self.state {
            SessionState::Composing => Some(&mut self.cart),
            SessionState::Submitting => None,
        }
    }

    /// The payload currently in flight, if any.
    pub fn in_flight(&self) -> Option<&OrderSubmission> {
        self.in_flight.as_ref()
    }

    /// Validate the cart, build the payload and enter `Submitting`.
    ///
    /// Refused while another submission is in flight. An empty cart is a
    /// validation failure and the session stays in `Composing`.
    pub fn begin_submission(&mut self) -> Result<OrderSubmission, SubmitError> {
        if self.is_submitting() {
            warn!(table_id = %self.table_id, "submission already in flight");
            return Err(SubmitError::AlreadySubmitting);
        }

        let payload = self
            .cart
            .to_submission_payload(self.table_id, self.staff_id)?;
        self.state = SessionState::Submitting;
        self.in_flight = Some(payload.clone());
        Ok(payload)
    }

    /// Resolve the in-flight submission, stamping success with the current time.
    pub fn complete_submission(
        &mut self,
        result: Result<SubmissionReceipt, SubmitError>,
    ) -> Result<PlacedOrder, SubmitError> {
        self.complete_submission_at(result, Utc::now())
    }

    /// Resolve the in-flight submission.
    ///
    /// Success clears the cart and returns the placed order. Failure leaves
    /// the cart untouched and hands the error back. Either way the session
    /// returns to `Composing`.
    pub fn complete_submission_at(
        &mut self,
        result: Result<SubmissionReceipt, SubmitError>,
        now: DateTime<Utc>,
    ) -> Result<PlacedOrder, SubmitError> {
        let payload = self.in_flight.take().ok_or(SubmitError::NotSubmitting)?;
        self.state = SessionState::Composing;

        match result {
            Ok(receipt) => {
                let placed = PlacedOrder::from_submission(&payload, receipt.id, now);
                self.cart.clear();
                info!(
                    table_id = %self.table_id,
                    order_id = ?placed.order_id,
                    items = placed.item_count,
                    total = %placed.total,
                    "order placed"
                );
                Ok(placed)
            }
            Err(error) => {
                warn!(
                    table_id = %self.table_id,
                    %error,
                    retryable = error.is_retryable(),
                    "order submission failed; cart kept for retry"
                );
                Err(error)
            }
        }
    }

    /// Begin, send through `submitter`, and complete in one call.
    pub fn submit_with(
        &mut self,
        submitter: &dyn OrderSubmitter,
    ) -> Result<PlacedOrder, SubmitError> {
        let payload = self.begin_submission()?;
        info!(
            table_id = %self.table_id,
            submitter = submitter.name(),
            lines = payload.order_items.len(),
            "submitting order"
        );
        let result = submitter.submit(&payload);
        self.complete_submission(result)
    }
}
