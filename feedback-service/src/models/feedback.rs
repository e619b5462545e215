use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

/// Message returned to clients when the feedback text is blank.
pub const EMPTY_TEXT_MESSAGE: &str = "O texto não pode estar vazio.";

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct FeedbackRequest {
    /// Free-form customer feedback.
    #[schema(example = "A câmera do celular é incrível, mas a bateria dura pouco.")]
    pub text: String,
}

impl Validate for FeedbackRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.text.trim().is_empty() {
            let mut error = ValidationError::new("blank");
            error.message = Some(Cow::Borrowed(EMPTY_TEXT_MESSAGE));

            let mut errors = ValidationErrors::new();
            errors.add("text", error);
            return Err(errors);
        }
        Ok(())
    }
}

/// Overall tone of a piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positivo,
    Negativo,
    Neutro,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positivo, Sentiment::Negativo, Sentiment::Neutro];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positivo => "positivo",
            Sentiment::Negativo => "negativo",
            Sentiment::Neutro => "neutro",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured analysis returned by `POST /analyze`.
///
/// Every field is mandatory: a model answer that omits one is rejected
/// instead of being filled with a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct FeedbackResponse {
    pub sentimento: Sentiment,
    pub topicos: Vec<String>,
    pub sumario: String,
    pub insight_acionavel: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}
