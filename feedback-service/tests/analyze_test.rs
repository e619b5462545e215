//! Integration tests for the `/analyze` endpoint.
//!
//! The router is driven in-process with `oneshot`; the model provider is the
//! mock, so no network access or API key is needed.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use feedback_service::config::FeedbackConfig;
use feedback_service::models::{FeedbackResponse, Sentiment, EMPTY_TEXT_MESSAGE};
use feedback_service::services::providers::mock::MockTextProvider;
use feedback_service::{build_router, AppState};
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const CAMERA_FEEDBACK: &str = "O app trava toda vez que abro a câmera, muito frustrante.";
const CAMERA_ANALYSIS: &str = r#"{"sentimento":"negativo","topicos":["estabilidade","câmera"],"sumario":"Usuário relata travamentos no app ao abrir a câmera.","insight_acionavel":"Priorizar correção de bug na funcionalidade de câmera."}"#;

fn test_config(extra: &[(&str, &str)]) -> FeedbackConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("GOOGLE_API_KEY".to_string(), "test-api-key".to_string()),
        ("ANALYSIS_TIMEOUT_SECS".to_string(), "5".to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    FeedbackConfig::from_lookup(CoreConfig::default(), |k| vars.get(k).cloned())
        .expect("Failed to build test config")
}

fn app_with(provider: Arc<MockTextProvider>) -> Router {
    build_router(AppState::with_provider(test_config(&[]), provider))
}

async fn post_analyze(app: Router, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

#[tokio::test]
async fn camera_feedback_returns_structured_analysis() {
    let provider = Arc::new(MockTextProvider::returning(CAMERA_ANALYSIS));
    let response = post_analyze(app_with(provider.clone()), json!({ "text": CAMERA_FEEDBACK })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let expected: Value = serde_json::from_str(CAMERA_ANALYSIS).unwrap();
    assert_eq!(body, expected);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn success_response_has_exactly_four_fields() {
    let provider = Arc::new(MockTextProvider::returning(
        r#"{"sentimento":"positivo","topicos":["entrega"],"sumario":"Chegou rápido.","insight_acionavel":"Manter parceiro logístico.","extra":"ignorado"}"#,
    ));
    let response = post_analyze(app_with(provider), json!({ "text": "Entrega super rápida!" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let object = body.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["insight_acionavel", "sentimento", "sumario", "topicos"]);

    let typed: FeedbackResponse = serde_json::from_value(body).unwrap();
    assert!(Sentiment::ALL.contains(&typed.sentimento));
}

#[tokio::test]
async fn empty_text_is_rejected_without_calling_provider() {
    let provider = Arc::new(MockTextProvider::returning(CAMERA_ANALYSIS));
    let response = post_analyze(app_with(provider.clone()), json!({ "text": "" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], EMPTY_TEXT_MESSAGE);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn whitespace_text_is_rejected_without_calling_provider() {
    let provider = Arc::new(MockTextProvider::returning(CAMERA_ANALYSIS));

    for text in [" ", "   \n\t ", "\r\n"] {
        let response = post_analyze(app_with(provider.clone()), json!({ "text": text })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "text {text:?}");
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn non_json_model_output_returns_500_with_detail() {
    let provider = Arc::new(MockTextProvider::returning("Claro! O sentimento é negativo."));
    let response = post_analyze(app_with(provider), json!({ "text": CAMERA_FEEDBACK })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    let details = body["details"].as_str().unwrap();
    assert!(details.starts_with("Erro na análise da IA:"));
    assert!(details.contains("invalid JSON"));
    assert!(body.get("sentimento").is_none());
}

#[tokio::test]
async fn missing_field_returns_500_instead_of_defaulting() {
    let provider = Arc::new(MockTextProvider::returning(
        r#"{"sentimento":"negativo","topicos":["câmera"],"sumario":"Trava."}"#,
    ));
    let response = post_analyze(app_with(provider), json!({ "text": CAMERA_FEEDBACK })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("insight_acionavel"));
}

#[tokio::test]
async fn provider_error_returns_500() {
    let provider = Arc::new(MockTextProvider::failing("quota exceeded"));
    let response = post_analyze(app_with(provider.clone()), json!({ "text": CAMERA_FEEDBACK })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["details"].as_str().unwrap().contains("quota exceeded"));
    // No retry
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn provider_timeout_returns_500() {
    let provider = Arc::new(
        MockTextProvider::returning(CAMERA_ANALYSIS).with_delay(Duration::from_secs(3)),
    );
    let state = AppState::with_provider(test_config(&[("ANALYSIS_TIMEOUT_SECS", "1")]), provider);
    let response = post_analyze(build_router(state), json!({ "text": CAMERA_FEEDBACK })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["details"].as_str().unwrap().contains("did not answer"));
}

#[tokio::test]
async fn repeated_calls_are_idempotent_and_uncached() {
    let provider = Arc::new(MockTextProvider::returning(CAMERA_ANALYSIS));
    let app = app_with(provider.clone());

    let first = body_json(post_analyze(app.clone(), json!({ "text": CAMERA_FEEDBACK })).await).await;
    let second = body_json(post_analyze(app, json!({ "text": CAMERA_FEEDBACK })).await).await;

    assert_eq!(first, second);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn feedback_text_reaches_the_prompt_verbatim() {
    let provider = Arc::new(MockTextProvider::returning(CAMERA_ANALYSIS));
    let text = "  Atendimento demorou, mas resolveram.  ";
    let response = post_analyze(app_with(provider.clone()), json!({ "text": text })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let prompt = provider.last_prompt().unwrap();
    assert!(prompt.contains(&format!("---\n{}\n---", text)));
}

#[tokio::test]
async fn preflight_from_trusted_origin_allows_credentials() {
    let provider = Arc::new(MockTextProvider::returning(CAMERA_ANALYSIS));
    let response = app_with(provider)
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/analyze")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn untrusted_origin_is_not_allowed() {
    let provider = Arc::new(MockTextProvider::returning(CAMERA_ANALYSIS));
    let response = app_with(provider)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/analyze")
                .header(header::ORIGIN, "http://attacker.example")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "text": CAMERA_FEEDBACK }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let provider = Arc::new(MockTextProvider::returning(CAMERA_ANALYSIS));
    let response = app_with(provider)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/analyze")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-request-id", "feedback-req-1")
                .body(Body::from(json!({ "text": CAMERA_FEEDBACK }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "feedback-req-1");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
}
