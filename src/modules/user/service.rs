use actix::Addr;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::modules::realtime::events::BroadcastToAll;
use crate::modules::realtime::message::ServerMessage;
use crate::modules::realtime::server::WebSocketServer;
use crate::modules::user::model::{SyncProfile, UserResponse};
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::UserEntity;

/// Profile reads may lag presence writes by at most this long.
const PROFILE_CACHE_TTL_SECS: usize = 60;

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<RedisCache>,
    ws_server: Arc<Addr<WebSocketServer>>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<RedisCache>,
        ws_server: Arc<Addr<WebSocketServer>>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache, ws_server }
    }

    /// Session sync from the identity provider: upsert the profile,
    /// bring this user online and push everyone else offline (the
    /// single-active-session policy lives in the repository so it is
    /// atomic with the upsert).
    pub async fn sync_profile(
        &self,
        profile: SyncProfile,
    ) -> Result<Uuid, error::SystemError> {
        let user_id = self.repo.sync_profile(&profile).await?;

        self.cache.delete(&format!("user:{user_id}")).await?;

        self.ws_server
            .do_send(BroadcastToAll { message: ServerMessage::UserOnline { user_id } });

        Ok(user_id)
    }

    /// Heartbeat endpoint behind the client's activity/visibility
    /// listeners. Unknown external ids no-op silently.
    pub async fn set_online(
        &self,
        external_id: &str,
        online: bool,
    ) -> Result<(), error::SystemError> {
        let Some(user) = self.repo.find_by_external_id(external_id).await? else {
            return Ok(());
        };

        self.repo.set_online(external_id, online).await?;
        self.cache.delete(&format!("user:{}", user.id)).await?;

        let message = if online {
            ServerMessage::UserOnline { user_id: user.id }
        } else {
            ServerMessage::UserOffline {
                user_id: user.id,
                last_seen: chrono::Utc::now().to_rfc3339(),
            }
        };
        self.ws_server.do_send(BroadcastToAll { message });

        Ok(())
    }

    pub async fn get_users(&self) -> Result<Vec<UserResponse>, error::SystemError> {
        let users = self.repo.find_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = format!("user:{id}");
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            return Ok(cached_user);
        }

        let user = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        let response = UserResponse::from(user);
        self.cache.set(&key, &response, PROFILE_CACHE_TTL_SECS).await?;

        Ok(response)
    }

    /// Resolves the authenticated caller's internal user row. Callers
    /// must have synced their profile at least once.
    pub async fn require_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<UserEntity, error::SystemError> {
        self.repo
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("User profile not synced"))
    }
}
