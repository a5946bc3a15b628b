use uuid::Uuid;

use crate::api::error;
use crate::modules::user::model::SyncProfile;
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::UserEntity;

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let user =
            sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE external_id = $1")
                .bind(external_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        let users =
            sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = ANY($1)")
                .bind(ids.to_vec())
                .fetch_all(&self.pool)
                .await?;

        Ok(users)
    }

    async fn find_all(&self) -> Result<Vec<UserEntity>, error::SystemError> {
        let users =
            sqlx::query_as::<_, UserEntity>("SELECT * FROM users ORDER BY display_name")
                .fetch_all(&self.pool)
                .await?;

        Ok(users)
    }

    async fn sync_profile(&self, profile: &SyncProfile) -> Result<Uuid, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (id, external_id, display_name, avatar_url, email, is_online, last_seen)
            VALUES ($1, $2, $3, $4, $5, TRUE, NOW())
            ON CONFLICT (external_id)
            DO UPDATE SET
                display_name = EXCLUDED.display_name,
                avatar_url = EXCLUDED.avatar_url,
                email = EXCLUDED.email,
                is_online = TRUE,
                last_seen = NOW(),
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&profile.external_id)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .bind(&profile.email)
        .fetch_one(tx.as_mut())
        .await?;

        // single-active-session policy: the syncing user is the one
        // session this deployment fronts, everyone else goes offline
        sqlx::query("UPDATE users SET is_online = FALSE WHERE id <> $1 AND is_online")
            .bind(id)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;

        Ok(id)
    }

    async fn set_online(
        &self,
        external_id: &str,
        online: bool,
    ) -> Result<(), error::SystemError> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_online = $2, last_seen = NOW(), updated_at = NOW()
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .bind(online)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
