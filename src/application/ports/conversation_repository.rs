use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Conversation, ConversationId, Message, MessageId};

use super::{MessagePage, RepositoryError};

/// Conversation log port: conversation and message persistence, plus
/// cursor-paginated history retrieval.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Create an empty conversation with an auto-numbered title. The number
    /// is a creation sequence over all conversations ever created, so it
    /// never repeats even after deletions.
    async fn create_conversation(&self) -> Result<Conversation, RepositoryError>;

    /// All conversations, newest-created first, each annotated with the
    /// timestamp of its most recent assistant reply.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, RepositoryError>;

    async fn get_conversation(&self, id: ConversationId) -> Result<Conversation, RepositoryError>;

    /// Remove the conversation and, atomically, all of its messages. A
    /// second delete fails `NotFound`; deletion is deliberately not
    /// idempotent.
    async fn delete_conversation(&self, id: ConversationId) -> Result<(), RepositoryError>;

    async fn append_message(&self, message: &Message) -> Result<(), RepositoryError>;

    /// Advance the conversation's last-activity timestamp.
    async fn touch_last_message_at(
        &self,
        id: ConversationId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Full message history, oldest first.
    async fn get_history(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;

    /// One page of history. Without a cursor, the `limit` newest messages;
    /// with a cursor, up to `limit` messages at or older than it. Issued
    /// pages are stable under concurrent appends: new messages sort above
    /// every already-issued cursor and never shift an old page.
    async fn get_page(
        &self,
        conversation_id: ConversationId,
        cursor: Option<MessageId>,
        limit: usize,
    ) -> Result<MessagePage, RepositoryError>;
}
