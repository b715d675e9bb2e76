use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use parley::application::ports::{ConversationRepository, RepositoryError};
use parley::domain::{Message, MessageRole};
use parley::infrastructure::persistence::SqliteConversationRepository;

async fn test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database")
}

async fn test_repository(pool: &SqlitePool) -> SqliteConversationRepository {
    let repository = SqliteConversationRepository::new(pool.clone());
    repository
        .migrate()
        .await
        .expect("Failed to run migrations");
    repository
}

fn title_number(title: &str) -> u64 {
    title
        .strip_prefix("Conversation #")
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(|| panic!("Unexpected title: {}", title))
}

#[tokio::test]
async fn given_new_conversation_when_creating_then_title_is_auto_numbered() {
    let pool = test_pool().await;
    let repository = test_repository(&pool).await;

    let conversation = repository
        .create_conversation()
        .await
        .expect("Failed to create conversation");

    assert_eq!(conversation.title, "Conversation #1");
    assert!(conversation.last_message_at.is_none());

    let retrieved = repository
        .get_conversation(conversation.id)
        .await
        .expect("Failed to retrieve conversation");
    assert_eq!(retrieved.id, conversation.id);
    assert_eq!(retrieved.title, conversation.title);
}

#[tokio::test]
async fn given_intervening_deletions_when_creating_then_numbers_keep_increasing() {
    let pool = test_pool().await;
    let repository = test_repository(&pool).await;

    let first = repository.create_conversation().await.expect("create");
    let second = repository.create_conversation().await.expect("create");
    let third = repository.create_conversation().await.expect("create");

    repository
        .delete_conversation(second.id)
        .await
        .expect("delete");

    let fourth = repository.create_conversation().await.expect("create");

    let numbers = [
        title_number(&first.title),
        title_number(&third.title),
        title_number(&fourth.title),
    ];
    assert_eq!(numbers, [1, 3, 4]);
}

#[tokio::test]
async fn given_existing_conversations_when_migrating_fresh_then_counter_is_seeded_from_count() {
    let pool = test_pool().await;
    let repository = test_repository(&pool).await;

    repository.create_conversation().await.expect("create");
    repository.create_conversation().await.expect("create");

    // Simulate a restart that lost the counter row but not the data.
    sqlx::query("DELETE FROM counters")
        .execute(&pool)
        .await
        .expect("reset counter");

    let restarted = test_repository(&pool).await;
    let next = restarted.create_conversation().await.expect("create");

    assert_eq!(title_number(&next.title), 3);
}

#[tokio::test]
async fn given_conversation_with_messages_when_deleting_then_cascade_removes_all_messages() {
    let pool = test_pool().await;
    let repository = test_repository(&pool).await;

    let conversation = repository.create_conversation().await.expect("create");
    for i in 0..4 {
        let role = if i % 2 == 0 {
            MessageRole::User
        } else {
            MessageRole::Assistant
        };
        let message = Message::new(conversation.id, role, format!("message {}", i));
        repository.append_message(&message).await.expect("append");
    }

    repository
        .delete_conversation(conversation.id)
        .await
        .expect("delete");

    let result = repository.get_conversation(conversation.id).await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));

    let row = sqlx::query("SELECT COUNT(*) AS count FROM messages WHERE conversation_id = $1")
        .bind(conversation.id.to_string())
        .fetch_one(&pool)
        .await
        .expect("count");
    let count: i64 = row.get("count");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn given_deleted_conversation_when_deleting_again_then_not_found() {
    let pool = test_pool().await;
    let repository = test_repository(&pool).await;

    let conversation = repository.create_conversation().await.expect("create");
    repository
        .delete_conversation(conversation.id)
        .await
        .expect("first delete");

    let second = repository.delete_conversation(conversation.id).await;
    assert!(matches!(second, Err(RepositoryError::NotFound(_))));
}

#[tokio::test]
async fn given_multiple_conversations_when_listing_then_newest_created_first() {
    let pool = test_pool().await;
    let repository = test_repository(&pool).await;

    let first = repository.create_conversation().await.expect("create");
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = repository.create_conversation().await.expect("create");

    let reply = Message::new(first.id, MessageRole::Assistant, "Hi".to_string());
    repository.append_message(&reply).await.expect("append");
    repository
        .touch_last_message_at(first.id, reply.created_at)
        .await
        .expect("touch");

    let listed = repository.list_conversations().await.expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
    assert!(listed[0].last_message_at.is_none());
    assert!(listed[1].last_message_at.is_some());
}

#[tokio::test]
async fn given_missing_conversation_when_touching_activity_then_not_found() {
    let pool = test_pool().await;
    let repository = test_repository(&pool).await;

    let result = repository
        .touch_last_message_at(parley::domain::ConversationId::new(), chrono::Utc::now())
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}
