//! The generated OpenAPI document and the Swagger UI mounted next to it.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use feedback_service::config::FeedbackConfig;
use feedback_service::handlers::health::WELCOME_MESSAGE;
use feedback_service::services::providers::mock::MockTextProvider;
use feedback_service::{build_router, AppState, OPENAPI_JSON_PATH};
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;

fn app() -> Router {
    let vars = HashMap::from([("GOOGLE_API_KEY".to_string(), "test-api-key".to_string())]);
    let config = FeedbackConfig::from_lookup(CoreConfig::default(), |k| vars.get(k).cloned())
        .expect("Failed to build test config");
    build_router(AppState::with_provider(
        config,
        Arc::new(MockTextProvider::returning("{}")),
    ))
}

async fn get(uri: &str) -> axum::response::Response {
    app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn openapi_document_describes_analyze_endpoint() {
    let response = get(OPENAPI_JSON_PATH).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let doc: Value = serde_json::from_slice(&bytes).expect("OpenAPI document is not JSON");

    assert_eq!(doc["info"]["title"], "InsightStream AI API");
    assert_eq!(
        doc["info"]["description"],
        "Uma API para analisar feedback de clientes usando IA."
    );
    assert_eq!(doc["info"]["version"], "1.0.0");

    let analyze = &doc["paths"]["/analyze"]["post"];
    assert!(analyze.is_object(), "missing POST /analyze: {}", doc["paths"]);
    assert!(analyze["responses"]["200"].is_object());
    assert!(analyze["responses"]["400"].is_object());
    assert!(doc["paths"]["/"]["get"].is_object());

    let schemas = &doc["components"]["schemas"];
    for name in ["FeedbackRequest", "FeedbackResponse", "Sentiment", "WelcomeResponse"] {
        assert!(schemas[name].is_object(), "missing schema {name}");
    }
    assert_eq!(
        schemas["Sentiment"]["enum"],
        serde_json::json!(["positivo", "negativo", "neutro"])
    );
}

#[tokio::test]
async fn swagger_ui_is_served_under_docs() {
    let response = get("/docs/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let csp = response.headers()[header::CONTENT_SECURITY_POLICY]
        .to_str()
        .unwrap()
        .to_string();
    assert!(csp.starts_with("default-src 'self'"), "{csp}");
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "SAMEORIGIN");
}

#[test]
fn welcome_banner_points_to_docs() {
    assert!(WELCOME_MESSAGE.contains("/docs"));
}
