use async_trait::async_trait;
use thiserror::Error;

use aria_core::domain::chat::{ChatRole, ChatTurn, Conversation, ConversationId, MessageMetadata};

pub mod conversation;
pub mod memory;

pub use conversation::SqlConversationRepository;
pub use memory::InMemoryConversationRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Storage for chat conversations and their turns.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create_conversation(
        &self,
        title: &str,
        user_id: Option<&str>,
    ) -> Result<Conversation, RepositoryError>;

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        role: ChatRole,
        content: &str,
        metadata: MessageMetadata,
    ) -> Result<ChatTurn, RepositoryError>;

    /// Newest first, optionally restricted to one user.
    async fn list_conversations(
        &self,
        user_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Conversation>, RepositoryError>;

    /// Oldest first.
    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ChatTurn>, RepositoryError>;
}
