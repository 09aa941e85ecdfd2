use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use aria_core::domain::chat::{ChatRole, ChatTurn, Conversation, ConversationId, MessageMetadata};

use super::{ConversationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid timestamp `{value}`: {e}")))
}

fn row_to_conversation(row: &sqlx::sqlite::SqliteRow) -> Result<Conversation, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let title: String = row.try_get("title").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_id: Option<String> =
        row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Conversation {
        id: ConversationId(id),
        title,
        user_id,
        created_at: decode_timestamp(&created_at)?,
    })
}

fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<ChatTurn, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let conversation_id: String =
        row.try_get("conversation_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let role: String = row.try_get("role").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let content: String =
        row.try_get("content").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let metadata_json: String =
        row.try_get("metadata_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let metadata: MessageMetadata = serde_json::from_str(&metadata_json)
        .map_err(|e| RepositoryError::Decode(format!("message metadata: {e}")))?;

    Ok(ChatTurn {
        id,
        conversation_id: ConversationId(conversation_id),
        role: role.parse::<ChatRole>().map_err(RepositoryError::Decode)?,
        content,
        metadata,
        created_at: decode_timestamp(&created_at)?,
    })
}

#[async_trait::async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn create_conversation(
        &self,
        title: &str,
        user_id: Option<&str>,
    ) -> Result<Conversation, RepositoryError> {
        let conversation = Conversation {
            id: ConversationId::generate(),
            title: title.to_string(),
            user_id: user_id.map(ToString::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO conversation (id, title, user_id, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(conversation.id.as_str())
        .bind(&conversation.title)
        .bind(&conversation.user_id)
        .bind(encode_timestamp(conversation.created_at))
        .execute(&self.pool)
        .await?;

        Ok(conversation)
    }

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        role: ChatRole,
        content: &str,
        metadata: MessageMetadata,
    ) -> Result<ChatTurn, RepositoryError> {
        let turn = ChatTurn {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.clone(),
            role,
            content: content.to_string(),
            metadata,
            created_at: Utc::now(),
        };
        let metadata_json = serde_json::to_string(&turn.metadata)
            .map_err(|e| RepositoryError::Decode(format!("message metadata: {e}")))?;

        sqlx::query(
            "INSERT INTO message (id, conversation_id, role, content, metadata_json, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&turn.id)
        .bind(turn.conversation_id.as_str())
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(metadata_json)
        .bind(encode_timestamp(turn.created_at))
        .execute(&self.pool)
        .await?;

        Ok(turn)
    }

    async fn list_conversations(
        &self,
        user_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, title, user_id, created_at
             FROM conversation
             WHERE (?1 IS NULL OR user_id = ?1)
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_conversation).collect::<Result<Vec<_>, _>>()
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ChatTurn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, conversation_id, role, content, metadata_json, created_at
             FROM message
             WHERE conversation_id = ?
             ORDER BY created_at ASC, rowid ASC",
        )
        .bind(conversation_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_turn).collect::<Result<Vec<_>, _>>()
    }
}
