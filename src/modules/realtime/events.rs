/// Actor messages exchanged between session actors and the server
/// actor.
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;
use super::session::WebSocketSession;

/// A new WebSocket connection registered its session actor.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: Uuid,
    pub addr: Addr<WebSocketSession>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

/// Session proved who it speaks for; binds session id to user id.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Authenticate {
    pub session_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinRoom {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct LeaveRoom {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
}

/// Fan a message out to every user subscribed to the conversation.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct BroadcastToRoom {
    pub conversation_id: Uuid,
    pub message: ServerMessage,
    /// Skip this user's sessions (usually the originator).
    pub skip_user_id: Option<Uuid>,
}

/// Deliver to a specific set of users regardless of room membership
/// (e.g. members of a conversation that was just created).
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct SendToUsers {
    pub user_ids: Vec<Uuid>,
    pub message: ServerMessage,
}

#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct BroadcastToAll {
    pub message: ServerMessage,
}
