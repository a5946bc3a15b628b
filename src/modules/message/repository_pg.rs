use uuid::Uuid;

use crate::api::error;
use crate::modules::message::model::InsertMessage;
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::{toggle_reaction, MessageEntity};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn create(
        &self,
        message: &InsertMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the conversation serializes concurrent sends:
        // pointer updates and unread increments cannot interleave.
        let conversation_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM conversations WHERE id = $1 FOR UPDATE",
        )
        .bind(message.conversation_id)
        .fetch_optional(tx.as_mut())
        .await?
        .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        let created = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, content, reply_to_id, reactions)
            VALUES ($1, $2, $3, $4, $5, '[]'::jsonb)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(conversation_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.reply_to_id)
        .fetch_one(tx.as_mut())
        .await?;

        sqlx::query(
            "UPDATE conversations SET last_message_id = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(conversation_id)
        .bind(created.id)
        .bind(created.created_at)
        .execute(tx.as_mut())
        .await?;

        sqlx::query(
            r#"
            INSERT INTO unread_counters (user_id, conversation_id, unread_count)
            SELECT p.user_id, $1, 1
            FROM participants p
            WHERE p.conversation_id = $1
              AND p.user_id <> $2
            ON CONFLICT (user_id, conversation_id)
            DO UPDATE SET unread_count = unread_counters.unread_count + 1
            "#,
        )
        .bind(conversation_id)
        .bind(message.sender_id)
        .execute(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message =
            sqlx::query_as::<_, MessageEntity>("SELECT * FROM messages WHERE id = $1")
                .bind(message_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(message)
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // has index on (conversation_id, created_at)
        let messages = sqlx::query_as::<_, MessageEntity>(
            "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn edit(
        &self,
        message_id: &Uuid,
        requester_id: &Uuid,
        content: &str,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let updated = sqlx::query_as::<_, MessageEntity>(
            r#"
            UPDATE messages
            SET content = $3, edited_at = NOW()
            WHERE id = $1
              AND sender_id = $2
              AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(message_id)
        .bind(requester_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(message) => Ok(Some(message)),
            // guard did not match: hand back the unchanged row (or None
            // when the id itself is unknown)
            None => self.find_by_id(message_id).await,
        }
    }

    async fn soft_delete(
        &self,
        message_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let updated = sqlx::query_as::<_, MessageEntity>(
            r#"
            UPDATE messages
            SET deleted_at = NOW()
            WHERE id = $1
              AND sender_id = $2
              AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(message_id)
        .bind(requester_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(message) => Ok(Some(message)),
            None => self.find_by_id(message_id).await,
        }
    }

    async fn toggle_reaction(
        &self,
        message_id: &Uuid,
        emoji: &str,
        user_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let message = sqlx::query_as::<_, MessageEntity>(
            "SELECT * FROM messages WHERE id = $1 FOR UPDATE",
        )
        .bind(message_id)
        .fetch_optional(tx.as_mut())
        .await?;

        let Some(mut message) = message else {
            tx.commit().await?;
            return Ok(None);
        };

        toggle_reaction(&mut message.reactions, emoji, user_id);

        let updated = sqlx::query_as::<_, MessageEntity>(
            "UPDATE messages SET reactions = $2 WHERE id = $1 RETURNING *",
        )
        .bind(message_id)
        .bind(sqlx::types::Json(&message.reactions))
        .fetch_one(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }
}
