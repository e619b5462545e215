//! Mock provider implementation for testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// What the mock answers with on every call.
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Empty,
    RateLimited,
    ApiError(String),
}

/// Mock text provider for testing.
///
/// Always returns the same reply, counts calls and keeps the last prompt and
/// parameters so tests can assert on what the analyzer sent.
pub struct MockTextProvider {
    reply: MockReply,
    delay: Duration,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_params: Mutex<Option<GenerationParams>>,
}

impl MockTextProvider {
    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            last_params: Mutex::new(None),
        }
    }

    /// Reply with the given text.
    pub fn returning(text: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Text(text.into()))
    }

    /// Reply successfully but without any text.
    pub fn empty() -> Self {
        Self::with_reply(MockReply::Empty)
    }

    /// Fail every call as rate limited.
    pub fn rate_limited() -> Self {
        Self::with_reply(MockReply::RateLimited)
    }

    /// Fail every call with an API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(MockReply::ApiError(message.into()))
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }

    pub fn last_params(&self) -> Option<GenerationParams> {
        self.last_params.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        if let Ok(mut last) = self.last_params.lock() {
            *last = Some(params.clone());
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let text = match &self.reply {
            MockReply::Text(text) => Some(text.clone()),
            MockReply::Empty => None,
            MockReply::RateLimited => return Err(ProviderError::RateLimited),
            MockReply::ApiError(msg) => return Err(ProviderError::ApiError(msg.clone())),
        };

        Ok(ProviderResponse {
            output_tokens: text.as_ref().map(|t| t.len() as i32 / 4).unwrap_or(0),
            text,
            input_tokens: prompt.len() as i32 / 4,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.reply {
            MockReply::ApiError(msg) => Err(ProviderError::ApiError(msg.clone())),
            _ => Ok(()),
        }
    }
}
