use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::{Validate, ValidationErrors};

use crate::models::{FeedbackRequest, FeedbackResponse};
use crate::startup::AppState;

/// `POST /analyze`: run a structured analysis of one customer feedback text.
///
/// Blank text is rejected with 400 before the provider is contacted. Any
/// provider or parsing failure becomes a 500 carrying the failure detail.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Structured analysis of the feedback", body = FeedbackResponse),
        (status = 400, description = "Feedback text is empty or blank"),
        (status = 500, description = "The AI provider failed or returned an invalid analysis")
    ),
    tag = "Analysis"
)]
pub async fn analyze_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    request.validate().map_err(|errors| {
        tracing::debug!(errors = %errors, "Rejected blank feedback");
        AppError::BadRequest(anyhow::anyhow!(first_message(&errors)))
    })?;

    tracing::debug!(text_len = request.text.len(), "Analyzing feedback");

    let analysis = state.analyzer.analyze(&request.text).await?;
    Ok(Json(analysis))
}

/// Client-facing message of the first field error, falling back to the
/// aggregated description.
fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}
