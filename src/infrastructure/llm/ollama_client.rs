use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CompletionClient, CompletionError};
use crate::domain::Message;

use super::flatten_history;
use super::retry::{RetryPolicy, run_with_retries};

/// Ollama backend: `POST /api/generate` with a model name and the flattened
/// prompt. Depending on server age the reply text arrives under `response`
/// or `completion`; neither present is a contract break.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    policy: RetryPolicy,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    completion: Option<String>,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, policy: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            base_url,
            model,
            policy,
        }
    }

    async fn request_once(&self, prompt: &str) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| CompletionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        generated
            .response
            .or(generated.completion)
            .ok_or_else(|| {
                CompletionError::MalformedResponse(
                    "neither 'response' nor 'completion' field present".to_string(),
                )
            })
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    #[tracing::instrument(skip(self, history, cancel), fields(model = %self.model, history_len = history.len()))]
    async fn complete(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
    ) -> Result<String, CompletionError> {
        let prompt = flatten_history(history);
        run_with_retries(&self.policy, cancel, || self.request_once(&prompt)).await
    }
}
