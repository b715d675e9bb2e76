use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    CompletionClient, CompletionError, ConversationRepository, MessagePage, RepositoryError,
};
use crate::domain::{Conversation, ConversationId, Message, MessageId, MessageRole};

/// Orchestrates the conversation log and the completion backend.
pub struct ChatService {
    repository: Arc<dyn ConversationRepository>,
    completion_client: Arc<dyn CompletionClient>,
}

impl ChatService {
    pub fn new(
        repository: Arc<dyn ConversationRepository>,
        completion_client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            repository,
            completion_client,
        }
    }

    pub async fn create_conversation(&self) -> Result<Conversation, ChatError> {
        let conversation = self.repository.create_conversation().await?;
        tracing::info!(conversation_id = %conversation.id, title = %conversation.title, "Conversation created");
        Ok(conversation)
    }

    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.repository.list_conversations().await?)
    }

    pub async fn get_conversation_page(
        &self,
        conversation_id: ConversationId,
        cursor: Option<MessageId>,
        limit: usize,
    ) -> Result<ConversationPage, ChatError> {
        let conversation = self.repository.get_conversation(conversation_id).await?;
        let page = self
            .repository
            .get_page(conversation_id, cursor, limit)
            .await?;
        Ok(ConversationPage { conversation, page })
    }

    pub async fn delete_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<(), ChatError> {
        self.repository.delete_conversation(conversation_id).await?;
        tracing::info!(conversation_id = %conversation_id, "Conversation deleted");
        Ok(())
    }

    /// Send one user turn and obtain the assistant reply.
    ///
    /// The user message is durably persisted before the backend is invoked.
    /// If the completion fails, the user message stays (no silent loss), no
    /// assistant message is written and the conversation's last-activity
    /// timestamp is left untouched; the error propagates with its kind
    /// intact. Resubmitting after a failure creates a new user message --
    /// this layer provides no idempotency.
    ///
    /// Concurrent sends on the same conversation are not serialized; two
    /// interleaved calls may each read a history missing the other's user
    /// turn.
    #[tracing::instrument(skip(self, content, cancel), fields(conversation_id = %conversation_id))]
    pub async fn send_message(
        &self,
        conversation_id: ConversationId,
        content: String,
        cancel: &CancellationToken,
    ) -> Result<SentMessage, ChatError> {
        self.repository.get_conversation(conversation_id).await?;

        let user_message = Message::new(conversation_id, MessageRole::User, content);
        self.repository.append_message(&user_message).await?;

        let history = self.repository.get_history(conversation_id).await?;

        let reply_content = match self.completion_client.complete(&history, cancel).await {
            Ok(content) => content,
            Err(CompletionError::Cancelled) => {
                tracing::debug!("Completion cancelled by caller");
                return Err(ChatError::Completion(CompletionError::Cancelled));
            }
            Err(e) => {
                tracing::error!(error = %e, "Completion failed, user message retained");
                return Err(ChatError::Completion(e));
            }
        };

        let reply = Message::new(conversation_id, MessageRole::Assistant, reply_content);
        self.repository.append_message(&reply).await?;
        self.repository
            .touch_last_message_at(conversation_id, reply.created_at)
            .await?;

        Ok(SentMessage {
            message: user_message,
            reply,
        })
    }
}

/// Conversation metadata together with one page of its history.
#[derive(Debug, Clone)]
pub struct ConversationPage {
    pub conversation: Conversation,
    pub page: MessagePage,
}

/// Both halves of a completed turn.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: Message,
    pub reply: Message,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("completion: {0}")]
    Completion(#[from] CompletionError),
}
