use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::Message;

use super::CompletionError;

/// Completion backend port. Given the full ordered history of a conversation
/// (oldest first, ending with the newest user turn), produce one reply.
///
/// Implementations are stateless across calls apart from configuration, and
/// must abort the in-flight request when `cancel` triggers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        history: &[Message],
        cancel: &CancellationToken,
    ) -> Result<String, CompletionError>;
}
