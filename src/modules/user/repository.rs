use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::SyncProfile, schema::UserEntity},
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn find_all(&self) -> Result<Vec<UserEntity>, error::SystemError>;

    /// Upserts the profile by external id, marks the synced user online
    /// with a fresh `last_seen`, and marks every other user offline —
    /// the single-active-session policy, applied atomically. Returns
    /// the internal user id.
    async fn sync_profile(&self, profile: &SyncProfile) -> Result<Uuid, error::SystemError>;

    /// Sets the online flag and stamps `last_seen`. Unknown external
    /// ids are a silent no-op (a heartbeat may race the first sync).
    async fn set_online(
        &self,
        external_id: &str,
        online: bool,
    ) -> Result<(), error::SystemError>;
}
