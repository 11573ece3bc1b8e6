//! Conversational API routes.
//!
//! - `POST /ai/chat`                          — handle one user turn
//! - `GET  /ai/conversations`                 — list conversations (filterable)
//! - `GET  /ai/conversations/{id}`            — fetch one conversation header
//! - `GET  /ai/conversations/{id}/messages`   — fetch a conversation's turns

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use maitred_agent::runtime::AgentRuntime;
use maitred_core::domain::conversation::{ConversationId, ConversationRecord, Turn};
use maitred_core::errors::{ApplicationError, InterfaceError};
use maitred_core::store::{ConversationFilter, ConversationStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<AgentRuntime>,
}

pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    Router::new()
        .route("/ai/chat", post(chat))
        .route("/ai/conversations", get(list_conversations))
        .route("/ai/conversations/{id}", get(get_conversation))
        .route("/ai/conversations/{id}/messages", get(list_messages))
        .with_state(AppState { runtime })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    pub user_id: Option<String>,
    pub restaurant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub restaurant_id: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationRecord>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub conversation_id: String,
    pub messages: Vec<Turn>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    correlation_id: String,
}

/// Boundary error: carries the interface classification and renders a
/// user-safe body. Internal detail stays in the logs.
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.user_message().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn reject(application: ApplicationError, correlation_id: &str) -> ApiError {
    error!(
        event_name = "api.request.failed",
        correlation_id = %correlation_id,
        error = %application,
        "request failed"
    );
    ApiError(application.into_interface(correlation_id))
}

fn store_failure(error: StoreError) -> ApplicationError {
    match error {
        StoreError::ConversationNotFound(id) => {
            ApplicationError::NotFound(format!("conversation {id}"))
        }
        other => ApplicationError::Persistence(other.to_string()),
    }
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    let conversation_id = request
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("conv_{}", Uuid::new_v4()));
    let id = ConversationId(conversation_id.clone());

    let reply = state
        .runtime
        .handle_user_turn(&id, &request.message, request.user_id, request.restaurant_id)
        .await
        .map_err(|failure| reject(ApplicationError::from(failure), &correlation_id))?;

    info!(
        event_name = "api.chat.replied",
        correlation_id = %correlation_id,
        conversation_id = %id,
        "chat turn handled"
    );

    Ok(Json(ChatResponse {
        response: reply,
        conversation_id,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ConversationListResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    let conversations = state
        .runtime
        .store()
        .list_conversations(ConversationFilter {
            user_id: query.user_id,
            restaurant_id: query.restaurant_id,
            limit: query.limit.unwrap_or(0),
            offset: query.offset.unwrap_or(0),
        })
        .await
        .map_err(|failure| reject(store_failure(failure), &correlation_id))?;

    Ok(Json(ConversationListResponse { conversations }))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationRecord>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let conversation_id = ConversationId(id);

    let record = state
        .runtime
        .store()
        .get_conversation(&conversation_id)
        .await
        .map_err(|failure| reject(store_failure(failure), &correlation_id))?
        .ok_or_else(|| {
            reject(
                ApplicationError::NotFound(format!("conversation {conversation_id}")),
                &correlation_id,
            )
        })?;

    Ok(Json(record))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let conversation_id = ConversationId(id);
    let store = state.runtime.store();

    // Missing conversations 404 instead of returning an empty list.
    store
        .get_conversation(&conversation_id)
        .await
        .map_err(|failure| reject(store_failure(failure), &correlation_id))?
        .ok_or_else(|| {
            reject(
                ApplicationError::NotFound(format!("conversation {conversation_id}")),
                &correlation_id,
            )
        })?;

    let messages = store
        .list_turns(&conversation_id)
        .await
        .map_err(|failure| reject(store_failure(failure), &correlation_id))?;

    Ok(Json(MessageListResponse { conversation_id: conversation_id.0, messages }))
}
