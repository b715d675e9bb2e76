mod sqlite_conversation_repository;

pub use sqlite_conversation_repository::SqliteConversationRepository;
