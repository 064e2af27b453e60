//! Observability subsystem.
//!
//! Tracing spans are created where the work happens (orchestrator stages,
//! outbound calls); this module only owns metric recording and exposition.
//! Observability is purely observational and never influences control flow.

pub mod metrics;
