//! Workflow subsystem.
//!
//! # Data Flow
//! ```text
//! WorkflowRequest (one per inbound submission)
//!     → orchestrator.rs (stage sequencing, settle-all parallel join)
//!     → client layer (breaker + retry + timeout per dependency)
//!     → StepResults (one entry per stage that ran)
//!     → WorkflowResult (authoritative record of what succeeded)
//!     → notifier.rs (typed completion event, best-effort)
//! ```

pub mod error;
pub mod join;
pub mod notifier;
pub mod orchestrator;
pub mod types;

pub use error::WorkflowError;
pub use notifier::{LogNotifier, Notifier, WebhookNotifier, WorkflowCompleted};
pub use orchestrator::WorkflowOrchestrator;
pub use types::{StepResult, StepResults, SubmissionType, WorkflowRequest, WorkflowResult};
