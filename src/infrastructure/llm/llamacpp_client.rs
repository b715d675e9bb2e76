use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CompletionClient, CompletionError};
use crate::domain::Message;

use super::flatten_history;
use super::retry::{RetryPolicy, run_with_retries};

/// llama.cpp server backend: a single `POST /completion` with the flattened
/// prompt, reply carries the generated text under `content`.
pub struct LlamaCppClient {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

impl LlamaCppClient {
    pub fn new(base_url: String, policy: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            base_url,
            policy,
        }
    }

    async fn request_once(&self, prompt: &str) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(format!("{}/completion", self.base_url))
            .json(&CompletionRequest { prompt })
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

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        Ok(completion.content)
    }
}

#[async_trait]
impl CompletionClient for LlamaCppClient {
    #[tracing::instrument(skip(self, history, cancel), fields(history_len = history.len()))]
    async fn complete(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
    ) -> Result<String, CompletionError> {
        let prompt = flatten_history(history);
        run_with_retries(&self.policy, cancel, || self.request_once(&prompt)).await
    }
}
