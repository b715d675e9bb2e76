use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CompletionClient, CompletionError};
use crate::domain::Message;

/// Canned-reply client for wiring the service without a live backend.
pub struct MockCompletionClient {
    reply: String,
}

impl MockCompletionClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        _history: &[Message],
        _cancel: &CancellationToken,
    ) -> Result<String, CompletionError> {
        Ok(self.reply.clone())
    }
}
