mod chat;
mod conversations;
mod health;
mod models;

pub use chat::send_message_handler;
pub use conversations::{
    create_conversation_handler, delete_conversation_handler, get_conversation_handler,
    list_conversations_handler,
};
pub use health::health_handler;
pub use models::{ConversationResponse, ErrorDetail, ErrorResponse, MessageResponse, PageInfo};
