use actix::Addr;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::conversation::repository::ConversationRepository;
use crate::modules::message::model::InsertMessage;
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::MessageEntity;
use crate::modules::realtime::events::BroadcastToRoom;
use crate::modules::realtime::message::ServerMessage;
use crate::modules::realtime::server::WebSocketServer;

#[derive(Clone)]
pub struct MessageService<M, C>
where
    M: MessageRepository + Send + Sync + 'static,
    C: ConversationRepository + Send + Sync + 'static,
{
    message_repo: Arc<M>,
    conversation_repo: Arc<C>,
    ws_server: Arc<Addr<WebSocketServer>>,
}

impl<M, C> MessageService<M, C>
where
    M: MessageRepository + Send + Sync + 'static,
    C: ConversationRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        message_repo: Arc<M>,
        conversation_repo: Arc<C>,
        ws_server: Arc<Addr<WebSocketServer>>,
    ) -> Self {
        MessageService { message_repo, conversation_repo, ws_server }
    }

    /// Appends a message. The repository applies the append, the
    /// last-message pointer move and the unread fan-out as one unit;
    /// an unknown conversation fails the whole operation.
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        conversation_id: Uuid,
        content: String,
        reply_to_id: Option<Uuid>,
    ) -> Result<MessageEntity, error::SystemError> {
        if content.trim().is_empty() {
            return Err(error::SystemError::bad_request("Message content cannot be empty"));
        }

        let message = self
            .message_repo
            .create(&InsertMessage { conversation_id, sender_id, content, reply_to_id })
            .await?;

        self.ws_server.do_send(BroadcastToRoom {
            conversation_id,
            message: ServerMessage::NewMessage {
                conversation_id,
                message: serde_json::to_value(&message).unwrap_or_default(),
            },
            skip_user_id: Some(sender_id),
        });

        Ok(message)
    }

    pub async fn get_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        self.conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        self.message_repo.find_by_conversation(&conversation_id).await
    }

    /// Sender-only edit. A non-sender (or an edit of a deleted message)
    /// gets the unchanged row back, not an error, so retries stay
    /// idempotent.
    pub async fn edit_message(
        &self,
        message_id: Uuid,
        user_id: Uuid,
        new_content: String,
    ) -> Result<MessageEntity, error::SystemError> {
        let message = self
            .message_repo
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        if message.sender_id != user_id || message.is_deleted() {
            return Ok(message);
        }

        let edited = self
            .message_repo
            .edit(&message_id, &user_id, &new_content)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        self.ws_server.do_send(BroadcastToRoom {
            conversation_id: edited.conversation_id,
            message: ServerMessage::MessageEdited {
                conversation_id: edited.conversation_id,
                message_id,
                new_content: edited.content.clone(),
            },
            skip_user_id: None,
        });

        Ok(edited)
    }

    /// Sender-only soft delete; same no-op contract as `edit_message`.
    pub async fn delete_message(
        &self,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<MessageEntity, error::SystemError> {
        let message = self
            .message_repo
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        if message.sender_id != user_id || message.is_deleted() {
            return Ok(message);
        }

        let deleted = self
            .message_repo
            .soft_delete(&message_id, &user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        self.ws_server.do_send(BroadcastToRoom {
            conversation_id: deleted.conversation_id,
            message: ServerMessage::MessageDeleted {
                conversation_id: deleted.conversation_id,
                message_id,
            },
            skip_user_id: None,
        });

        Ok(deleted)
    }

    /// Toggles a reaction; any participant may react, twice undoes.
    pub async fn react(
        &self,
        message_id: Uuid,
        emoji: String,
        user_id: Uuid,
    ) -> Result<MessageEntity, error::SystemError> {
        let message = self
            .message_repo
            .toggle_reaction(&message_id, &emoji, &user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        self.ws_server.do_send(BroadcastToRoom {
            conversation_id: message.conversation_id,
            message: ServerMessage::ReactionUpdated {
                conversation_id: message.conversation_id,
                message_id,
                reactions: message.reactions.clone(),
            },
            skip_user_id: None,
        });

        Ok(message)
    }
}
