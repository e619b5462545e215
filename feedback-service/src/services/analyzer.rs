//! Feedback analysis on top of a text provider.
//!
//! The analyzer turns customer feedback into a prompt that asks the model for
//! one JSON object, sends it once, and validates whatever comes back before
//! handing a [`FeedbackResponse`] to the caller. Model output is treated as
//! untrusted: it is parsed into a generic JSON value first and only then
//! checked against the response schema.

use super::metrics;
use super::providers::{GenerationParams, ProviderError, TextProvider};
use crate::models::FeedbackResponse;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

const JSON_MIME_TYPE: &str = "application/json";

/// Why an analysis could not be produced.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("provider returned no text")]
    EmptyResponse,

    #[error("provider returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("provider response does not match the expected schema: {0}")]
    SchemaMismatch(String),
}

impl AnalysisError {
    fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Provider(e) => e.kind(),
            AnalysisError::Timeout(_) => "timeout",
            AnalysisError::EmptyResponse => "empty_response",
            AnalysisError::InvalidJson(_) => "invalid_json",
            AnalysisError::SchemaMismatch(_) => "schema_mismatch",
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::UpstreamError(format!("Erro na análise da IA: {}", err))
    }
}

/// Build the analysis prompt for a piece of feedback.
///
/// The output is a pure function of `text`.
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"Você é um Analista de Produto Sênior especialista em analisar feedback de clientes.
Analise o seguinte texto e retorne EXATAMENTE um objeto JSON, sem nenhum outro texto ou formatação como markdown.
A estrutura do JSON deve ser:
{{
  "sentimento": "positivo" | "negativo" | "neutro",
  "topicos": ["string"],
  "sumario": "string",
  "insight_acionavel": "string"
}}

Texto para análise:
---
{text}
---
"#
    )
}

/// Validate raw model output and convert it into a [`FeedbackResponse`].
pub fn parse_analysis(raw: &str) -> Result<FeedbackResponse, AnalysisError> {
    let value: serde_json::Value =
        serde_json::from_str(raw.trim()).map_err(|e| AnalysisError::InvalidJson(e.to_string()))?;

    if !value.is_object() {
        return Err(AnalysisError::SchemaMismatch(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::SchemaMismatch(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Runs one provider call per feedback text.
#[derive(Clone)]
pub struct FeedbackAnalyzer {
    provider: Arc<dyn TextProvider>,
    model: String,
    timeout: Duration,
}

impl FeedbackAnalyzer {
    pub fn new(provider: Arc<dyn TextProvider>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    /// Analyze a feedback text. The caller is responsible for rejecting blank input.
    pub async fn analyze(&self, text: &str) -> Result<FeedbackResponse, AnalysisError> {
        let provider_name = self.provider.name();
        let prompt = build_prompt(text);
        let params = GenerationParams {
            response_mime_type: Some(JSON_MIME_TYPE.to_string()),
            ..Default::default()
        };

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.provider.generate(&prompt, &params))
            .await
            .map_err(|_| AnalysisError::Timeout(self.timeout))
            .and_then(|r| r.map_err(AnalysisError::from))
            .and_then(|response| {
                metrics::record_tokens(&self.model, response.input_tokens, response.output_tokens);
                let raw = response.text.ok_or(AnalysisError::EmptyResponse)?;
                parse_analysis(&raw)
            });
        metrics::record_provider_latency(provider_name, &self.model, start.elapsed().as_secs_f64());

        match &outcome {
            Ok(analysis) => {
                metrics::record_analysis(analysis.sentimento.as_str());
                tracing::info!(
                    provider = provider_name,
                    model = %self.model,
                    sentimento = %analysis.sentimento,
                    topic_count = analysis.topicos.len(),
                    "Feedback analyzed"
                );
            }
            Err(e) => {
                metrics::record_provider_error(provider_name, e.kind());
                tracing::warn!(
                    provider = provider_name,
                    model = %self.model,
                    error = %e,
                    "Feedback analysis failed"
                );
            }
        }

        outcome
    }
}
