use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::domain::{ConversationId, MessageId};
use crate::presentation::state::AppState;

use super::models::{
    ConversationResponse, MessageResponse, PageInfo, error_response, map_chat_error,
};

const DEFAULT_PAGE_LIMIT: usize = 20;
const MAX_PAGE_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct PageParams {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetailResponse {
    pub id: String,
    pub title: String,
    pub messages: Vec<MessageResponse>,
    pub page_info: PageInfo,
}

#[tracing::instrument(skip(state))]
pub async fn create_conversation_handler(State(state): State<AppState>) -> Response {
    match state.chat_service.create_conversation().await {
        Ok(conversation) => (
            StatusCode::CREATED,
            Json(ConversationResponse::from(&conversation)),
        )
            .into_response(),
        Err(e) => map_chat_error(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_conversations_handler(State(state): State<AppState>) -> Response {
    match state.chat_service.list_conversations().await {
        Ok(conversations) => Json(
            conversations
                .iter()
                .map(ConversationResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => map_chat_error(e),
    }
}

#[tracing::instrument(skip(state, params))]
pub async fn get_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let Ok(conversation_id) = id.parse::<ConversationId>() else {
        return error_response(StatusCode::NOT_FOUND, "conversation not found", "not_found");
    };

    let cursor = match params.cursor {
        Some(raw) => match raw.parse::<MessageId>() {
            Ok(cursor) => Some(cursor),
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid cursor",
                    "invalid_request_error",
                );
            }
        },
        None => None,
    };
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);

    match state
        .chat_service
        .get_conversation_page(conversation_id, cursor, limit)
        .await
    {
        Ok(result) => Json(ConversationDetailResponse {
            id: result.conversation.id.to_string(),
            title: result.conversation.title,
            messages: result.page.messages.iter().map(MessageResponse::from).collect(),
            page_info: PageInfo {
                next_cursor: result.page.next_cursor.map(|c| c.to_string()),
                prev_cursor: result.page.prev_cursor.map(|c| c.to_string()),
            },
        })
        .into_response(),
        Err(e) => map_chat_error(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(conversation_id) = id.parse::<ConversationId>() else {
        return error_response(StatusCode::NOT_FOUND, "conversation not found", "not_found");
    };

    match state.chat_service.delete_conversation(conversation_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => map_chat_error(e),
    }
}
