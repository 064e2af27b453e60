//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup: load config → validate → wire subsystems → start listener
//! Shutdown: signal received → stop accepting → drain in-flight → exit
//! ```
//!
//! # Design Decisions
//! - Shutdown never cancels an already-started saga; detached saga tasks
//!   run to completion and settle through the notifier

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
