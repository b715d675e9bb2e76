use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use parley::application::services::ChatService;
use parley::infrastructure::llm::MockCompletionClient;
use parley::infrastructure::persistence::SqliteConversationRepository;
use parley::presentation::{AppState, create_router};

async fn test_router(reply: &str) -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    let repository = Arc::new(SqliteConversationRepository::new(pool));
    repository
        .migrate()
        .await
        .expect("Failed to run migrations");

    let chat_service = Arc::new(ChatService::new(
        repository,
        Arc::new(MockCompletionClient::new(reply)),
    ));
    create_router(AppState { chat_service })
}

async fn send_json(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    };

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn given_running_service_when_checking_health_then_healthy() {
    let router = test_router("unused").await;

    let (status, body) = send_json(&router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn given_hello_when_sending_then_page_shows_both_turns_in_order() {
    let router = test_router("Hi there").await;

    let (status, created) = send_json(&router, "POST", "/api/conversations", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], json!("Conversation #1"));
    let id = created["id"].as_str().expect("conversation id").to_string();

    let (status, sent) = send_json(
        &router,
        "POST",
        &format!("/api/conversations/{}/messages", id),
        Some(json!({ "content": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["message"]["role"], json!("user"));
    assert_eq!(sent["message"]["content"], json!("Hello"));
    assert_eq!(sent["reply"]["role"], json!("assistant"));
    assert_eq!(sent["reply"]["content"], json!("Hi there"));

    let (status, page) =
        send_json(&router, "GET", &format!("/api/conversations/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let messages = page["messages"].as_array().expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], json!("user"));
    assert_eq!(messages[0]["content"], json!("Hello"));
    assert_eq!(messages[1]["role"], json!("assistant"));
    assert_eq!(messages[1]["content"], json!("Hi there"));
    assert_eq!(page["pageInfo"]["nextCursor"], Value::Null);
    assert_eq!(page["pageInfo"]["prevCursor"], Value::Null);
}

#[tokio::test]
async fn given_empty_content_when_sending_then_bad_request() {
    let router = test_router("unused").await;

    let (_, created) = send_json(&router, "POST", "/api/conversations", None).await;
    let id = created["id"].as_str().expect("conversation id").to_string();

    let (status, body) = send_json(
        &router,
        "POST",
        &format!("/api/conversations/{}/messages", id),
        Some(json!({ "content": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], json!("invalid_request_error"));
}

#[tokio::test]
async fn given_unknown_conversation_when_operating_then_not_found() {
    let router = test_router("unused").await;
    let missing = "/api/conversations/0192cfe0-0000-7000-8000-000000000000";

    let (status, _) = send_json(&router, "GET", missing, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&router, "DELETE", missing, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &router,
        "POST",
        &format!("{}/messages", missing),
        Some(json!({ "content": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], json!("not_found"));
}

#[tokio::test]
async fn given_oversized_limit_param_when_fetching_then_page_still_served() {
    let router = test_router("Hi there").await;

    let (_, created) = send_json(&router, "POST", "/api/conversations", None).await;
    let id = created["id"].as_str().expect("conversation id").to_string();
    send_json(
        &router,
        "POST",
        &format!("/api/conversations/{}/messages", id),
        Some(json!({ "content": "Hello" })),
    )
    .await;

    let (status, page) = send_json(
        &router,
        "GET",
        &format!(
            "/api/conversations/{}?limit=18446744073709551615",
            id
        ),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["messages"].as_array().expect("messages").len(), 2);
    assert_eq!(page["pageInfo"]["nextCursor"], Value::Null);
}

#[tokio::test]
async fn given_conversations_when_listing_then_newest_first_with_activity() {
    let router = test_router("Hi there").await;

    let (_, first) = send_json(&router, "POST", "/api/conversations", None).await;
    let (_, second) = send_json(&router, "POST", "/api/conversations", None).await;
    let first_id = first["id"].as_str().expect("id").to_string();

    send_json(
        &router,
        "POST",
        &format!("/api/conversations/{}/messages", first_id),
        Some(json!({ "content": "Hello" })),
    )
    .await;

    let (status, listed) = send_json(&router, "GET", "/api/conversations", None).await;
    assert_eq!(status, StatusCode::OK);
    let conversations = listed.as_array().expect("conversations");
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0]["id"], second["id"]);
    assert_eq!(conversations[1]["id"], first["id"]);
    assert_eq!(conversations[0]["lastMessageAt"], Value::Null);
    assert!(conversations[1]["lastMessageAt"].is_string());
}

#[tokio::test]
async fn given_deleted_conversation_when_fetching_then_not_found() {
    let router = test_router("Hi there").await;

    let (_, created) = send_json(&router, "POST", "/api/conversations", None).await;
    let id = created["id"].as_str().expect("id").to_string();
    send_json(
        &router,
        "POST",
        &format!("/api/conversations/{}/messages", id),
        Some(json!({ "content": "Hello" })),
    )
    .await;

    let (status, _) =
        send_json(&router, "DELETE", &format!("/api/conversations/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(&router, "GET", &format!("/api/conversations/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_request_id_header_when_calling_then_echoed_on_response() {
    let router = test_router("unused").await;

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .expect("request");

    let response = router.oneshot(request).await.expect("router response");
    let echoed = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(echoed, Some("trace-me-123"));
}
