/// Wire protocol between clients and the delivery layer.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::message::schema::Reaction;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Authenticate the connection with the identity provider's token.
    #[serde(rename_all = "camelCase")]
    Auth { token: String },

    /// Subscribe to a conversation's events.
    #[serde(rename_all = "camelCase")]
    JoinConversation { conversation_id: Uuid },

    #[serde(rename_all = "camelCase")]
    LeaveConversation { conversation_id: Uuid },

    /// Keep-alive.
    Ping,
}

/// Messages pushed from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AuthSuccess { user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    AuthFailed { reason: String },

    #[serde(rename_all = "camelCase")]
    ConversationCreated { conversation_id: Uuid },

    /// Full message object so clients can append without a refetch.
    #[serde(rename_all = "camelCase")]
    NewMessage { conversation_id: Uuid, message: serde_json::Value },

    #[serde(rename_all = "camelCase")]
    MessageEdited { conversation_id: Uuid, message_id: Uuid, new_content: String },

    #[serde(rename_all = "camelCase")]
    MessageDeleted { conversation_id: Uuid, message_id: Uuid },

    #[serde(rename_all = "camelCase")]
    ReactionUpdated { conversation_id: Uuid, message_id: Uuid, reactions: Vec<Reaction> },

    #[serde(rename_all = "camelCase")]
    MessagesRead { conversation_id: Uuid, user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    UserTyping { conversation_id: Uuid, user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    UserStoppedTyping { conversation_id: Uuid, user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    UserOnline { user_id: Uuid },

    #[serde(rename_all = "camelCase")]
    UserOffline { user_id: Uuid, last_seen: String },

    Pong,

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}
