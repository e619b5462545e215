//! feedback-service: structured sentiment and topic analysis of customer
//! feedback, backed by a generative-language model.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, ApiDoc, AppState, Application, OPENAPI_JSON_PATH};
