//! Order submission service seam and its implementations.
//!
//! The OrderSubmitter trait abstracts over the order service so sessions can
//! be driven against the real REST backend or an in-memory double.

use crate::config::ServiceConfig;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tableside_core::{CartError, OrderSubmission};
use thiserror::Error;
use tracing::debug;

/// Header carrying the payload fingerprint, so the backend can drop retries
/// of an order it already accepted.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Submission failures. Everything except `Validation` leaves the cart intact
/// for a retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("order validation failed: {0}")]
    Validation(#[from] CartError),

    #[error("an order for this table is already being submitted")]
    AlreadySubmitting,

    #[error("no submission in progress")]
    NotSubmitting,

    #[error("order service rejected the order: {0}")]
    Rejected(String),

    #[error("order service unreachable: {0}")]
    Transport(String),
}

impl SubmitError {
    /// Failures worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Transport(_))
    }
}

/// What the order service hands back on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionReceipt {
    /// Server-side order id, when the service returns one.
    #[serde(default, alias = "orderId")]
    pub id: Option<u64>,
}

/// Trait for order services.
pub trait OrderSubmitter: Send + Sync {
    /// Human-readable name of this submitter.
    fn name(&self) -> &str;

    /// Send one finalized order.
    fn submit(&self, payload: &OrderSubmission) -> Result<SubmissionReceipt, SubmitError>;
}

/// Submits orders to the REST backend with `POST {base_url}/orders`.
pub struct HttpSubmitter {
    client: reqwest::blocking::Client,
    orders_url: String,
}

impl HttpSubmitter {
    pub fn new(config: &ServiceConfig) -> Result<Self, SubmitError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SubmitError::Transport(format!("build HTTP client: {e}")))?;

        Ok(Self {
            client,
            orders_url: config.orders_url(),
        })
    }

    pub fn orders_url(&self) -> &str {
        &self.orders_url
    }
}

impl OrderSubmitter for HttpSubmitter {
    fn name(&self) -> &str {
        "http"
    }

    fn submit(&self, payload: &OrderSubmission) -> Result<SubmissionReceipt, SubmitError> {
        let fingerprint = payload.fingerprint();
        debug!(url = %self.orders_url, %fingerprint, "posting order");

        let response = self
            .client
            .post(&self.orders_url)
            .header(IDEMPOTENCY_HEADER, &fingerprint)
            .json(payload)
            .send()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .text()
                .map_err(|e| SubmitError::Transport(e.to_string()))?;
            // Some backends answer 201 with an empty body.
            if body.trim().is_empty() {
                return Ok(SubmissionReceipt::default());
            }
            return serde_json::from_str(&body)
                .map_err(|e| SubmitError::Transport(format!("unreadable response: {e}")));
        }

        let body = response.text().unwrap_or_default();
        let message = extract_message(&body).unwrap_or_else(|| status.to_string());
        if status.is_client_error() {
            Err(SubmitError::Rejected(message))
        } else {
            Err(SubmitError::Transport(message))
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"message": ...}` and `{"error": ...}`; falls back to the raw
/// text when it is not JSON.
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => ["message", "error", "detail"]
            .iter()
            .find_map(|field| value.get(field).and_then(|v| v.as_str()))
            .map(str::to_string)
            .or_else(|| Some(body.to_string())),
        Err(_) => Some(body.to_string()),
    }
}

/// In-memory submitter that records payloads.
///
/// Failures queued with [`RecordingSubmitter::fail_next`] are returned in
/// order before any further submission succeeds.
#[derive(Default)]
pub struct RecordingSubmitter {
    submitted: Mutex<Vec<OrderSubmission>>,
    failures: Mutex<VecDeque<SubmitError>>,
    next_id: AtomicU64,
}

impl RecordingSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: SubmitError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back(error);
        }
    }

    /// Payloads accepted so far.
    pub fn submitted(&self) -> Vec<OrderSubmission> {
        self.submitted
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Number of submit calls that reached this submitter, failed or not.
    pub fn call_count(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }
}

impl OrderSubmitter for RecordingSubmitter {
    fn name(&self) -> &str {
        "recording"
    }

    fn submit(&self, payload: &OrderSubmission) -> Result<SubmissionReceipt, SubmitError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        let failure = self
            .failures
            .lock()
            .map_err(|_| SubmitError::Transport("submitter state poisoned".into()))?
            .pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        self.submitted
            .lock()
            .map_err(|_| SubmitError::Transport("submitter state poisoned".into()))?
            .push(payload.clone());
        Ok(SubmissionReceipt { id: Some(id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tableside_core::{MenuItemId, OrderItemPayload, StaffId, TableId};

    fn payload() -> OrderSubmission {
        OrderSubmission {
            table_id: TableId(1),
            staff_id: StaffId(1),
            order_items: vec![OrderItemPayload {
                menu_item_id: MenuItemId(1),
                menu_item_name: "Burger".into(),
                quantity: 1,
                price: dec!(10.00),
                special_instructions: None,
            }],
        }
    }

    #[test]
    fn recording_submitter_records_and_numbers_orders() {
        let submitter = RecordingSubmitter::new();
        let a = submitter.submit(&payload()).unwrap();
        let b = submitter.submit(&payload()).unwrap();

        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(submitter.submitted().len(), 2);
    }

    #[test]
    fn queued_failures_come_first() {
        let submitter = RecordingSubmitter::new();
        submitter.fail_next(SubmitError::Transport("connection refused".into()));

        assert_eq!(
            submitter.submit(&payload()),
            Err(SubmitError::Transport("connection refused".into()))
        );
        assert!(submitter.submitted().is_empty());
        assert!(submitter.submit(&payload()).is_ok());
        assert_eq!(submitter.call_count(), 2);
    }

    #[test]
    fn http_submitter_targets_orders_endpoint() {
        let config = ServiceConfig::new("http://localhost:8080/api/");
        let submitter = HttpSubmitter::new(&config).unwrap();
        assert_eq!(submitter.orders_url(), "http://localhost:8080/api/orders");
        assert_eq!(submitter.name(), "http");
    }

    #[test]
    fn error_messages_are_extracted_from_json_bodies() {
        assert_eq!(
            extract_message(r#"{"message": "table is closed"}"#),
            Some("table is closed".into())
        );
        assert_eq!(
            extract_message(r#"{"error": "unknown staff"}"#),
            Some("unknown staff".into())
        );
        assert_eq!(extract_message("Bad Gateway"), Some("Bad Gateway".into()));
        assert_eq!(extract_message("   "), None);
    }

    #[test]
    fn receipt_accepts_either_id_field() {
        let a: SubmissionReceipt = serde_json::from_str(r#"{"id": 55}"#).unwrap();
        let b: SubmissionReceipt = serde_json::from_str(r#"{"orderId": 56, "status": "new"}"#).unwrap();
        assert_eq!(a.id, Some(55));
        assert_eq!(b.id, Some(56));
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(SubmitError::Transport("timeout".into()).is_retryable());
        assert!(!SubmitError::Rejected("bad".into()).is_retryable());
        assert!(!SubmitError::Validation(CartError::EmptyCart).is_retryable());
    }
}
