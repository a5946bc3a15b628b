use uuid::Uuid;

use crate::api::error;
use crate::modules::conversation::model::{
    ConversationDetail, ConversationOverview, ConversationOverviewRaw,
};
use crate::modules::conversation::repository::{ConversationRepository, UnreadRepository};
use crate::modules::conversation::schema::{direct_key, ConversationEntity};

#[derive(Clone)]
pub struct ConversationPgRepository {
    pool: sqlx::PgPool,
}

impl ConversationPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for ConversationPgRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation =
            sqlx::query_as::<_, ConversationEntity>("SELECT * FROM conversations WHERE id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversation)
    }

    async fn find_detail(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationDetail>, error::SystemError> {
        let conversation = match self.find_by_id(conversation_id).await? {
            Some(c) => c,
            None => return Ok(None),
        };

        let participants = self.participant_ids(conversation_id).await?;

        Ok(Some(ConversationDetail {
            conversation_id: conversation.id,
            _type: conversation._type,
            name: conversation.name,
            participants,
            last_message_id: conversation.last_message_id,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
        }))
    }

    async fn resolve_or_create_direct(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        let key = direct_key(user_a, user_b);

        let mut tx = self.pool.begin().await?;

        if let Some(existing) = sqlx::query_as::<_, ConversationEntity>(
            "SELECT * FROM conversations WHERE direct_key = $1",
        )
        .bind(&key)
        .fetch_optional(tx.as_mut())
        .await?
        {
            tx.commit().await?;
            return Ok(existing);
        }

        // The unique index on direct_key is the arbiter under
        // concurrency: the loser inserts nothing and reads the
        // winner's row below.
        let inserted = sqlx::query_as::<_, ConversationEntity>(
            r#"
            INSERT INTO conversations (id, type, direct_key)
            VALUES ($1, 'direct', $2)
            ON CONFLICT (direct_key) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&key)
        .fetch_optional(tx.as_mut())
        .await?;

        match inserted {
            Some(conversation) => {
                sqlx::query(
                    r#"
                    INSERT INTO participants (conversation_id, user_id)
                    SELECT $1, unnest($2::uuid[])
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(conversation.id)
                .bind(vec![*user_a, *user_b])
                .execute(tx.as_mut())
                .await?;

                tx.commit().await?;
                Ok(conversation)
            }
            None => {
                tx.commit().await?;

                let conversation = sqlx::query_as::<_, ConversationEntity>(
                    "SELECT * FROM conversations WHERE direct_key = $1",
                )
                .bind(&key)
                .fetch_one(&self.pool)
                .await?;

                Ok(conversation)
            }
        }
    }

    async fn create_group(
        &self,
        name: &str,
        member_ids: &[Uuid],
    ) -> Result<ConversationEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let conversation = sqlx::query_as::<_, ConversationEntity>(
            r#"
            INSERT INTO conversations (id, type, name)
            VALUES ($1, 'group', $2)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .fetch_one(tx.as_mut())
        .await?;

        sqlx::query(
            r#"
            INSERT INTO participants (conversation_id, user_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(conversation.id)
        .bind(member_ids.to_vec())
        .execute(tx.as_mut())
        .await?;

        tx.commit().await?;

        Ok(conversation)
    }

    async fn find_all_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationOverview>, error::SystemError> {
        let rows = sqlx::query_as::<_, ConversationOverviewRaw>(
            r#"
            SELECT
                c.id,
                c.type,
                c.name,
                c.created_at,
                c.updated_at,

                u.unread_count  AS unread_count,

                m.content       AS last_content,
                m.sender_id     AS last_sender_id,
                m.created_at    AS last_created_at,
                m.deleted_at    AS last_deleted_at

            FROM conversations c

            JOIN participants p
                ON p.conversation_id = c.id
               AND p.user_id = $1

            LEFT JOIN unread_counters u
                ON u.conversation_id = c.id
               AND u.user_id = $1

            LEFT JOIN messages m
                ON m.id = c.last_message_id

            ORDER BY c.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ConversationOverview::from).collect())
    }

    async fn find_ids_for_user(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT conversation_id FROM participants WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn participant_ids(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<Uuid>, error::SystemError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM participants WHERE conversation_id = $1 ORDER BY joined_at, user_id",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[derive(Clone)]
pub struct UnreadPgRepository {
    pool: sqlx::PgPool,
}

impl UnreadPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UnreadRepository for UnreadPgRepository {
    async fn increment(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            INSERT INTO unread_counters (user_id, conversation_id, unread_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, conversation_id)
            DO UPDATE SET unread_count = unread_counters.unread_count + 1
            "#,
        )
        .bind(user_id)
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            "UPDATE unread_counters SET unread_count = 0 WHERE user_id = $1 AND conversation_id = $2",
        )
        .bind(user_id)
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT unread_count FROM unread_counters WHERE user_id = $1 AND conversation_id = $2",
        )
        .bind(user_id)
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count.unwrap_or(0))
    }
}
