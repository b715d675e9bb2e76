use chrono::{DateTime, Utc};

use super::ConversationId;

#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent assistant reply; `None` until the first
    /// completed turn. Advances monotonically.
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn new(title: String) -> Self {
        Self {
            id: ConversationId::new(),
            title,
            created_at: Utc::now(),
            last_message_at: None,
        }
    }
}
