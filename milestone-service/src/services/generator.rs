//! Milestone generation: validate, build the schema-constrained prompt, call
//! the provider once, and relay the generated JSON unchanged.

use crate::models::{GenerationRequest, MilestoneSet};
use crate::services::metrics;
use crate::services::prompt::PromptTemplate;
use crate::services::providers::{GenerationParams, ProviderError, TextProvider};
use serde::Deserialize;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Message returned when no API credential is configured.
pub const MISSING_API_KEY_MESSAGE: &str = "API key is not configured.";

/// Response schema constraining the model to `{ milestones: [{ level, milestone }] }`.
pub fn milestone_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "milestones": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "level": { "type": "NUMBER" },
                        "milestone": { "type": "STRING" }
                    },
                    "required": ["level", "milestone"]
                }
            }
        },
        "required": ["milestones"]
    })
}

#[derive(Clone)]
pub struct MilestoneGenerator {
    provider: Arc<dyn TextProvider>,
    prompt: PromptTemplate,
}

impl MilestoneGenerator {
    pub fn new(provider: Arc<dyn TextProvider>, prompt: PromptTemplate) -> Self {
        Self { provider, prompt }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<Value, AppError> {
        request.ensure_complete()?;

        if !self.provider.is_configured() {
            tracing::debug!("Generation requested but no API key is configured");
            return Err(AppError::ConfigError(anyhow::anyhow!(MISSING_API_KEY_MESSAGE)));
        }

        let prompt = self.prompt.render(&request.skill_name, &request.goal);
        let params = GenerationParams {
            output_schema: Some(milestone_schema()),
        };

        let started = Instant::now();
        let result = self.provider.generate(&prompt, &params).await;
        metrics::record_upstream_latency(
            self.provider.name(),
            self.provider.model(),
            started.elapsed().as_secs_f64(),
        );

        let response = result.map_err(|e| self.map_provider_error(e))?;
        metrics::record_tokens(
            self.provider.model(),
            response.input_tokens,
            response.output_tokens,
        );

        let generated: Value = serde_json::from_str(&response.text).map_err(|e| {
            tracing::error!(error = %e, "Generated text is not valid JSON");
            AppError::InternalError(anyhow::Error::new(e).context("parsing generated milestones"))
        })?;

        report_shape(&generated);

        Ok(generated)
    }

    fn map_provider_error(&self, err: ProviderError) -> AppError {
        metrics::record_upstream_error(self.provider.name(), err.error_type());

        match err {
            ProviderError::ApiError { status, body } => {
                tracing::error!(status, body = %body, "Gemini API error");
                AppError::UpstreamError { status, body }
            }
            ProviderError::NotConfigured(reason) => {
                tracing::debug!(reason = %reason, "Provider rejected request as unconfigured");
                AppError::ConfigError(anyhow::anyhow!(MISSING_API_KEY_MESSAGE))
            }
            other => {
                tracing::error!(error = %other, "Milestone generation failed");
                AppError::InternalError(anyhow::Error::new(other))
            }
        }
    }
}

/// Advisory only: deviations are logged and counted, never returned.
fn report_shape(generated: &Value) {
    let set = match MilestoneSet::deserialize(generated) {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(error = %e, "Generated payload does not match the milestone schema");
            metrics::record_validation_warning("shape");
            return;
        }
    };

    for issue in set.issues() {
        tracing::warn!(kind = issue.kind(), issue = %issue, "Generated milestones deviate from plan");
        metrics::record_validation_warning(issue.kind());
    }
}
