//! Chat endpoints and the service that persists each exchange.
//!
//! - `POST /api/v1/chat`
//! - `GET  /api/v1/conversations?limit=20`
//! - `GET  /api/v1/conversations/{id}/messages`

use std::sync::Arc;

use aria_agent::{assemble_reply, AgentRuntime};
use aria_core::domain::chat::{
    ChatReply, ChatRole, ChatTurn, Conversation, ConversationId, MessageMetadata,
};
use aria_core::errors::ApplicationError;
use aria_db::ConversationRepository;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;

pub const MAX_MESSAGE_CHARS: usize = 4000;
const TITLE_CHARS: usize = 50;
const DEFAULT_CONVERSATION_LIMIT: u32 = 20;

#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConversationQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<ChatTurn>,
}

pub struct ChatService {
    runtime: Arc<AgentRuntime>,
    conversations: Arc<dyn ConversationRepository>,
}

impl ChatService {
    pub fn new(runtime: Arc<AgentRuntime>, conversations: Arc<dyn ConversationRepository>) -> Self {
        Self { runtime, conversations }
    }

    /// Answers one message. Persistence failures are logged and never fail the request.
    pub async fn process_chat(
        &self,
        request: ChatRequest,
        user_id: Option<&str>,
    ) -> Result<ChatReply, ApplicationError> {
        validate_message(&request.message)?;

        let conversation_id = match request.conversation_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => ConversationId(id),
            None => self.open_conversation(&request.message, user_id).await,
        };

        self.record(&conversation_id, ChatRole::User, &request.message, MessageMetadata::default())
            .await;

        let turn = self.runtime.process_message(&request.message).await;
        let intent = turn.intent;
        let reply = assemble_reply(turn, conversation_id);

        self.record(&reply.conversation_id, ChatRole::Assistant, &reply.message, reply.metadata())
            .await;

        info!(
            event_name = "chat.reply.sent",
            conversation_id = %reply.conversation_id,
            intent = %intent,
            has_chart = reply.chart.is_some(),
            has_table = reply.table.is_some(),
            "chat reply assembled"
        );
        Ok(reply)
    }

    pub async fn list_conversations(&self, limit: u32) -> Vec<Conversation> {
        self.conversations.list_conversations(None, limit).await.unwrap_or_else(|error| {
            warn!(event_name = "chat.conversations.list_failed", error = %error, "listing conversations failed");
            Vec::new()
        })
    }

    pub async fn list_messages(&self, conversation_id: &ConversationId) -> Vec<ChatTurn> {
        self.conversations.list_messages(conversation_id).await.unwrap_or_else(|error| {
            warn!(
                event_name = "chat.messages.list_failed",
                conversation_id = %conversation_id,
                error = %error,
                "listing messages failed"
            );
            Vec::new()
        })
    }

    async fn open_conversation(&self, message: &str, user_id: Option<&str>) -> ConversationId {
        let title: String = message.chars().take(TITLE_CHARS).collect();
        match self.conversations.create_conversation(&title, user_id).await {
            Ok(conversation) => conversation.id,
            Err(error) => {
                let local = ConversationId::generate();
                warn!(
                    event_name = "chat.conversation.create_failed",
                    conversation_id = %local,
                    error = %error,
                    "conversation not persisted; using a local id"
                );
                local
            }
        }
    }

    async fn record(
        &self,
        conversation_id: &ConversationId,
        role: ChatRole,
        content: &str,
        metadata: MessageMetadata,
    ) {
        if let Err(error) =
            self.conversations.append_message(conversation_id, role, content, metadata).await
        {
            warn!(
                event_name = "chat.message.persist_failed",
                conversation_id = %conversation_id,
                role = role.as_str(),
                error = %error,
                "chat message not persisted"
            );
        }
    }
}

fn validate_message(message: &str) -> Result<(), ApplicationError> {
    let length = message.chars().count();
    if length == 0 {
        return Err(ApplicationError::InvalidInput("message must not be empty".to_string()));
    }
    if length > MAX_MESSAGE_CHARS {
        return Err(ApplicationError::InvalidInput(format!(
            "message must be at most {MAX_MESSAGE_CHARS} characters (got {length})"
        )));
    }
    Ok(())
}

pub fn router(service: Arc<ChatService>) -> Router {
    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/conversations", get(conversations))
        .route("/api/v1/conversations/{id}/messages", get(messages))
        .with_state(service)
}

async fn chat(
    State(service): State<Arc<ChatService>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ApplicationError::InvalidInput(rejection.body_text()))?;
    service.process_chat(request, None).await.map(Json).map_err(ApiError::from)
}

async fn conversations(
    State(service): State<Arc<ChatService>>,
    Query(query): Query<ConversationQuery>,
) -> Json<ConversationsResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_CONVERSATION_LIMIT);
    Json(ConversationsResponse { conversations: service.list_conversations(limit).await })
}

async fn messages(
    State(service): State<Arc<ChatService>>,
    Path(id): Path<String>,
) -> Json<MessagesResponse> {
    Json(MessagesResponse { messages: service.list_messages(&ConversationId(id)).await })
}
