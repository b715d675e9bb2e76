use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::ports::{CompletionError, RepositoryError};
use crate::application::services::ChatError;
use crate::domain::{Conversation, Message};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl From<&Conversation> for ConversationResponse {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id.to_string(),
            title: conversation.title.clone(),
            created_at: conversation.created_at,
            last_message_at: conversation.last_message_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            role: message.role.to_string(),
            content: message.content.clone(),
            created_at: message.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub next_cursor: Option<String>,
    pub prev_cursor: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
}

pub fn error_response(status: StatusCode, message: &str, kind: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: ErrorDetail {
                message: message.to_string(),
                r#type: kind.to_string(),
            },
        }),
    )
        .into_response()
}

/// Map service errors onto the external status taxonomy. Upstream failures
/// come back as 502 with a retry hint; cancellation is acknowledged without
/// an error log; anything unclassified stays opaque.
pub fn map_chat_error(error: ChatError) -> Response {
    match error {
        ChatError::Repository(RepositoryError::NotFound(what)) => {
            error_response(StatusCode::NOT_FOUND, &what, "not_found")
        }
        ChatError::Completion(CompletionError::Cancelled) => {
            tracing::debug!("Request cancelled by caller");
            client_closed_request()
        }
        ChatError::Completion(e @ CompletionError::Timeout(_)) => {
            tracing::error!(error = %e, "Completion backend timed out");
            error_response(
                StatusCode::BAD_GATEWAY,
                "Completion backend timed out, try again later",
                "upstream_error",
            )
        }
        ChatError::Completion(e @ CompletionError::UpstreamStatus { .. }) => {
            tracing::error!(error = %e, "Completion backend returned an error");
            error_response(
                StatusCode::BAD_GATEWAY,
                "Completion backend unavailable, try again later",
                "upstream_error",
            )
        }
        ChatError::Completion(e @ CompletionError::MalformedResponse(_)) => {
            tracing::error!(error = %e, "Completion backend broke its response contract");
            error_response(
                StatusCode::BAD_GATEWAY,
                "Completion backend returned an unexpected response",
                "upstream_error",
            )
        }
        other => {
            tracing::error!(error = %other, "Unhandled service error");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "internal_error",
            )
        }
    }
}

fn client_closed_request() -> Response {
    // 499 is non-standard but the conventional status for an aborted client.
    let status = StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_GATEWAY);
    error_response(status, "Request cancelled", "cancelled")
}
