//! Submission workflow orchestration service.
//!
//! A saga coordinator driving the submission-to-feedback pipeline across
//! five independently owned services, built with Tokio and Axum.
//!
//! # Architecture Overview
//! ```text
//! POST /api/submissions ──▶ http ──▶ workflow orchestrator
//!                                        │ stage 1 validate   (user)
//!                                        │ stage 2 submit     (submission)
//!                                        │ stage 3 feedback ∥ gamification
//!                                        │ stage 4 analytics
//!                                        ▼ stage 5 notify (best-effort)
//!                                   client layer
//!                        breaker ▸ retry ▸ timeout, per dependency
//!
//! Cross-cutting: config, resilience registry, observability, lifecycle
//! ```

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod workflow;

pub use config::OrchestratorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use workflow::{WorkflowOrchestrator, WorkflowRequest, WorkflowResult};
