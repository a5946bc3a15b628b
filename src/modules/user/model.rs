use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::user::schema::UserEntity;
use crate::utils::format_activity;

/// Profile fields pushed by the identity provider on session sync.
#[derive(Debug, Clone)]
pub struct SyncProfile {
    pub external_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SyncProfileRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PresenceRequest {
    pub online: bool,
}

#[derive(Serialize)]
pub struct SyncProfileResponse {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub external_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub email: String,
    pub is_online: bool,
    pub last_seen: Option<chrono::DateTime<chrono::Utc>>,
    /// Human label derived from the presence fields at projection time.
    pub activity: String,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        let activity =
            format_activity(entity.is_online, entity.last_seen, chrono::Utc::now());

        UserResponse {
            id: entity.id,
            external_id: entity.external_id,
            display_name: entity.display_name,
            avatar_url: entity.avatar_url,
            email: entity.email,
            is_online: entity.is_online,
            last_seen: entity.last_seen,
            activity,
        }
    }
}
