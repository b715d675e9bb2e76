mod completion_client;
mod completion_error;
mod conversation_repository;
mod message_page;
mod repository_error;

pub use completion_client::CompletionClient;
pub use completion_error::CompletionError;
pub use conversation_repository::ConversationRepository;
pub use message_page::MessagePage;
pub use repository_error::RepositoryError;
