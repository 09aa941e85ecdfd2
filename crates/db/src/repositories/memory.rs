use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use aria_core::domain::chat::{ChatRole, ChatTurn, Conversation, ConversationId, MessageMetadata};

use super::{ConversationRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: RwLock<Vec<Conversation>>,
    messages: RwLock<Vec<ChatTurn>>,
}

#[async_trait::async_trait]
impl ConversationRepository for InMemoryConversationRepository {
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
        self.conversations.write().await.push(conversation.clone());
        Ok(conversation)
    }

    async fn append_message(
        &self,
        conversation_id: &ConversationId,
        role: ChatRole,
        content: &str,
        metadata: MessageMetadata,
    ) -> Result<ChatTurn, RepositoryError> {
        let known = self.conversations.read().await.iter().any(|c| &c.id == conversation_id);
        if !known {
            return Err(RepositoryError::Decode(format!(
                "conversation `{conversation_id}` does not exist"
            )));
        }

        let turn = ChatTurn {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.clone(),
            role,
            content: content.to_string(),
            metadata,
            created_at: Utc::now(),
        };
        self.messages.write().await.push(turn.clone());
        Ok(turn)
    }

    async fn list_conversations(
        &self,
        user_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .iter()
            .rev()
            .filter(|c| user_id.map_or(true, |user| c.user_id.as_deref() == Some(user)))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_messages(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ChatTurn>, RepositoryError> {
        let messages = self.messages.read().await;
        Ok(messages.iter().filter(|m| &m.conversation_id == conversation_id).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use aria_core::domain::chat::{ChatRole, ConversationId, MessageMetadata};

    use super::InMemoryConversationRepository;
    use crate::repositories::ConversationRepository;

    #[tokio::test]
    async fn mirrors_sql_ordering() {
        let repo = InMemoryConversationRepository::default();
        let first = repo.create_conversation("uno", None).await.expect("create");
        let second = repo.create_conversation("dos", None).await.expect("create");
        repo.append_message(&first.id, ChatRole::User, "hola", MessageMetadata::default())
            .await
            .expect("append");
        repo.append_message(&first.id, ChatRole::Assistant, "¡hola!", MessageMetadata::default())
            .await
            .expect("append");

        let listed = repo.list_conversations(None, 1).await.expect("list");
        assert_eq!(listed[0].id, second.id);

        let messages = repo.list_messages(&first.id).await.expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "¡hola!");
    }

    #[tokio::test]
    async fn unknown_conversation_is_rejected() {
        let repo = InMemoryConversationRepository::default();

        let result = repo
            .append_message(
                &ConversationId("nope".to_string()),
                ChatRole::User,
                "hola",
                MessageMetadata::default(),
            )
            .await;

        assert!(result.is_err());
    }
}
