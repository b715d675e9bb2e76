use std::sync::Arc;

use crate::application::ports::CompletionClient;
use crate::presentation::config::{LlmProvider, LlmSettings};

use super::retry::RetryPolicy;
use super::{LlamaCppClient, OllamaClient};

pub struct CompletionClientFactory;

#[derive(Debug, thiserror::Error)]
pub enum CompletionFactoryError {
    #[error("missing base URL: {0} provider requires LLM_BASE_URL")]
    MissingBaseUrl(LlmProvider),
    #[error("missing model name: ollama provider requires LLM_MODEL")]
    MissingModel,
}

impl CompletionClientFactory {
    /// Pure construction, no I/O. A provider with missing required settings
    /// is rejected here, at startup, not on the first call.
    pub fn create(
        settings: &LlmSettings,
    ) -> Result<Arc<dyn CompletionClient>, CompletionFactoryError> {
        let policy = RetryPolicy {
            timeout: settings.timeout,
            max_retries: settings.max_retries,
            base_delay: settings.retry_base_delay,
        };

        let base_url = settings
            .base_url
            .clone()
            .ok_or(CompletionFactoryError::MissingBaseUrl(settings.provider))?;

        match settings.provider {
            LlmProvider::LlamaCpp => {
                tracing::info!(base_url = %base_url, "Using llama.cpp completion backend");
                Ok(Arc::new(LlamaCppClient::new(base_url, policy)))
            }
            LlmProvider::Ollama => {
                let model = settings
                    .model
                    .clone()
                    .ok_or(CompletionFactoryError::MissingModel)?;
                tracing::info!(base_url = %base_url, model = %model, "Using Ollama completion backend");
                Ok(Arc::new(OllamaClient::new(base_url, model, policy)))
            }
        }
    }
}
