//! Tableside Runner — order sessions around the core cart engine.
//!
//! This crate builds on `tableside-core` to provide:
//! - Service configuration loaded from TOML
//! - The order submission seam (REST submitter + in-memory recorder)
//! - Order sessions with a submitting state and retry-safe failure handling
//! - Placed orders with elapsed-time labels for the floor view
//! - Scripted composition replay

pub mod clock;
pub mod config;
pub mod script;
pub mod session;
pub mod submitter;

pub use clock::{elapsed_label, PlacedOrder};
pub use config::{ConfigError, ServiceConfig};
pub use script::{ReplayReport, Script, ScriptError, Step, StepOutcome};
pub use session::{OrderSession, SessionState};
pub use submitter::{
    HttpSubmitter, OrderSubmitter, RecordingSubmitter, SubmissionReceipt, SubmitError,
};
