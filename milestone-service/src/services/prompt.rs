//! System prompt template and user-turn rendering.

use service_core::error::AppError;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../../prompts/system_prompt.md");

/// Immutable prompt shared by every request.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system_prompt: Arc<str>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl PromptTemplate {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Arc::from(system_prompt.into()),
        }
    }

    /// Read the system prompt from `path`, or use the bundled one.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read system prompt from {}: {}",
                path.display(),
                e
            ))
        })?;

        if contents.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "System prompt at {} is empty",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loaded custom system prompt");
        Ok(Self::new(contents))
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Full text sent as the single user turn.
    pub fn render(&self, skill_name: &str, goal: &str) -> String {
        format!("{}\n\n{}", self.system_prompt, user_turn(skill_name, goal))
    }
}

pub fn user_turn(skill_name: &str, goal: &str) -> String {
    format!("skill name: {}\ngoal: {}", skill_name, goal)
}
