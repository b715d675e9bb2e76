use crate::domain::{Message, MessageId};

/// One page of conversation history, presented oldest-first.
#[derive(Debug, Clone)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Id of the next older message beyond this page; `None` when the page
    /// reaches the start of the conversation.
    pub next_cursor: Option<MessageId>,
    /// Cursor toward newer messages. Only computed when the page itself was
    /// fetched with a cursor; the cursorless page already shows the newest
    /// messages, so there is nothing newer to page toward.
    pub prev_cursor: Option<MessageId>,
}
