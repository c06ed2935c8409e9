//! Mock provider implementation for testing.

use super::{GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted outcome returned by [`MockTextProvider`] on every call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful response with this candidate text.
    Text(String),
    /// Upstream non-success status with a raw body.
    Status { status: u16, body: String },
    /// Transport failure.
    NetworkFailure,
}

/// Mock text provider that counts calls and records the last request.
pub struct MockTextProvider {
    configured: bool,
    reply: MockReply,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, GenerationParams)>>,
}

impl MockTextProvider {
    pub fn new(reply: MockReply) -> Self {
        Self {
            configured: true,
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(MockReply::Text(text.into()))
    }

    /// A provider with no credential.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(MockReply::NetworkFailure)
        }
    }

    /// Number of times `generate` reached the provider.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|(prompt, _)| prompt.clone()))
    }

    pub fn last_params(&self) -> Option<GenerationParams> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|(_, params)| params.clone()))
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.configured {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not configured".to_string(),
            ));
        }

        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some((prompt.to_string(), params.clone()));
        }

        match &self.reply {
            MockReply::Text(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: prompt.len() as i32 / 4,
                output_tokens: text.len() as i32 / 4,
            }),
            MockReply::Status { status, body } => Err(ProviderError::ApiError {
                status: *status,
                body: body.clone(),
            }),
            MockReply::NetworkFailure => Err(ProviderError::NetworkError(
                "connection refused".to_string(),
            )),
        }
    }
}
