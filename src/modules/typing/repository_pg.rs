use uuid::Uuid;

use crate::api::error;
use crate::modules::typing::repository::TypingRepository;
use crate::modules::typing::schema::TypingSignalEntity;

#[derive(Clone)]
pub struct TypingPgRepository {
    pool: sqlx::PgPool,
}

impl TypingPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TypingRepository for TypingPgRepository {
    async fn set_typing(
        &self,
        conversation_id: &Uuid,
        user_id: &Uuid,
        is_typing: bool,
    ) -> Result<(), error::SystemError> {
        if is_typing {
            sqlx::query(
                r#"
                INSERT INTO typing_signals (conversation_id, user_id, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (conversation_id, user_id)
                DO UPDATE SET updated_at = NOW()
                "#,
            )
            .bind(conversation_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                "DELETE FROM typing_signals WHERE conversation_id = $1 AND user_id = $2",
            )
            .bind(conversation_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<TypingSignalEntity>, error::SystemError> {
        let signals = sqlx::query_as::<_, TypingSignalEntity>(
            "SELECT * FROM typing_signals WHERE conversation_id = $1",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(signals)
    }
}
