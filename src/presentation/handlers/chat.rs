use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::domain::ConversationId;
use crate::infrastructure::observability::sanitize_content;
use crate::presentation::state::AppState;

use super::models::{MessageResponse, error_response, map_chat_error};

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Serialize)]
pub struct SendMessageResponse {
    pub message: MessageResponse,
    pub reply: MessageResponse,
}

#[tracing::instrument(skip(state, request))]
pub async fn send_message_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Response {
    let Ok(conversation_id) = id.parse::<ConversationId>() else {
        return error_response(StatusCode::NOT_FOUND, "conversation not found", "not_found");
    };

    if request.content.trim().is_empty() {
        tracing::warn!("Send request with empty content");
        return error_response(
            StatusCode::BAD_REQUEST,
            "Message content must not be empty",
            "invalid_request_error",
        );
    }

    tracing::debug!(content = %sanitize_content(&request.content), "Processing message send");

    // One token per send; dropping the handler mid-flight aborts only this
    // call's outbound attempt, never persistence already committed.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    match state
        .chat_service
        .send_message(conversation_id, request.content, &cancel)
        .await
    {
        Ok(sent) => Json(SendMessageResponse {
            message: MessageResponse::from(&sent.message),
            reply: MessageResponse::from(&sent.reply),
        })
        .into_response(),
        Err(e) => map_chat_error(e),
    }
}
