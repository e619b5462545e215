//! HTTP handlers for the feedback service.

pub mod analyze;
pub mod health;

pub use analyze::analyze_feedback;
pub use health::{health_check, metrics_endpoint, readiness_check, root};
