use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::conversation::schema::ConversationType;

#[derive(Debug, Deserialize, Validate)]
pub struct NewConversation {
    #[serde(rename = "type")]
    pub _type: ConversationType,
    #[validate(length(max = 128, message = "Group name is too long"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "At least one member is required"))]
    pub member_ids: Vec<Uuid>,
}

/// Preview of the message a conversation's last-message pointer refers
/// to. `deleted` tells the client to render a placeholder instead of
/// `content`; masking is the reader's job, the store keeps the text.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LastMessagePreview {
    pub content: String,
    pub sender_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationOverview {
    pub conversation_id: Uuid,
    #[serde(rename = "type")]
    pub _type: ConversationType,
    pub name: Option<String>,
    pub unread_count: i64,
    pub last_message: Option<LastMessagePreview>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    pub conversation_id: Uuid,
    #[serde(rename = "type")]
    pub _type: ConversationType,
    pub name: Option<String>,
    pub participants: Vec<Uuid>,
    pub last_message_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Raw join row for the conversation list query; folded into
/// `ConversationOverview` by the repository.
#[derive(FromRow)]
pub struct ConversationOverviewRaw {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    pub _type: ConversationType,
    pub name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    pub unread_count: Option<i64>,

    pub last_content: Option<String>,
    pub last_sender_id: Option<Uuid>,
    pub last_created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<ConversationOverviewRaw> for ConversationOverview {
    fn from(raw: ConversationOverviewRaw) -> Self {
        let last_message = match (raw.last_content, raw.last_sender_id, raw.last_created_at) {
            (Some(content), Some(sender_id), Some(created_at)) => Some(LastMessagePreview {
                content,
                sender_id,
                created_at,
                deleted: raw.last_deleted_at.is_some(),
            }),
            _ => None,
        };

        ConversationOverview {
            conversation_id: raw.id,
            _type: raw._type,
            name: raw.name,
            unread_count: raw.unread_count.unwrap_or(0),
            last_message,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}
