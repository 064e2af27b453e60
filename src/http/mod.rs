//! HTTP surface of the orchestrator.
//!
//! # Data Flow
//! ```text
//! POST /api/submissions
//!     → handlers.rs (202 ack, saga spawned detached)
//!     → orchestrator → notifier push
//!
//! POST /api/submissions/{id}/retry
//!     → handlers.rs (saga run inline)
//!     → full WorkflowResult in the response
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
