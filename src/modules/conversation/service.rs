use actix::Addr;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        conversation::{
            model::{ConversationDetail, ConversationOverview},
            repository::{ConversationRepository, UnreadRepository},
            schema::ConversationType,
        },
        realtime::{
            events::{BroadcastToRoom, SendToUsers},
            message::ServerMessage,
            server::WebSocketServer,
        },
    },
};

#[derive(Clone)]
pub struct ConversationService<C, U>
where
    C: ConversationRepository + Send + Sync + 'static,
    U: UnreadRepository + Send + Sync + 'static,
{
    conversation_repo: Arc<C>,
    unread_repo: Arc<U>,
    ws_server: Arc<Addr<WebSocketServer>>,
}

impl<C, U> ConversationService<C, U>
where
    C: ConversationRepository + Send + Sync + 'static,
    U: UnreadRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        conversation_repo: Arc<C>,
        unread_repo: Arc<U>,
        ws_server: Arc<Addr<WebSocketServer>>,
    ) -> Self {
        ConversationService { conversation_repo, unread_repo, ws_server }
    }

    /// Resolves or creates a conversation. Direct conversations are
    /// deduplicated per participant pair; groups are always new rows.
    pub async fn create_conversation(
        &self,
        _type: ConversationType,
        name: Option<String>,
        member_ids: Vec<Uuid>,
        user_id: Uuid,
    ) -> Result<ConversationDetail, error::SystemError> {
        let conversation = match _type {
            ConversationType::Direct => {
                let other = member_ids.first().ok_or_else(|| {
                    error::SystemError::bad_request(
                        "A direct conversation needs the other participant",
                    )
                })?;

                self.conversation_repo.resolve_or_create_direct(&user_id, other).await?
            }

            ConversationType::Group => {
                let name = name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        error::SystemError::bad_request("Group name is required")
                    })?;

                // creator is always a member; dedup preserves first-seen order
                let mut members: Vec<Uuid> = Vec::with_capacity(member_ids.len() + 1);
                for id in std::iter::once(user_id).chain(member_ids.into_iter()) {
                    if !members.contains(&id) {
                        members.push(id);
                    }
                }

                if members.len() < 2 {
                    return Err(error::SystemError::bad_request(
                        "A group needs at least two distinct members",
                    ));
                }

                let conversation = self.conversation_repo.create_group(name, &members).await?;

                self.ws_server.do_send(SendToUsers {
                    user_ids: members,
                    message: ServerMessage::ConversationCreated {
                        conversation_id: conversation.id,
                    },
                });

                conversation
            }
        };

        self.conversation_repo
            .find_detail(&conversation.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))
    }

    pub async fn get_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<ConversationDetail, error::SystemError> {
        self.conversation_repo
            .find_detail(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))
    }

    pub async fn get_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationOverview>, error::SystemError> {
        self.conversation_repo.find_all_for_user(&user_id).await
    }

    /// Read acknowledgement: the only path that resets an unread counter.
    pub async fn acknowledge_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        self.conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        self.unread_repo.reset(&user_id, &conversation_id).await?;

        self.ws_server.do_send(BroadcastToRoom {
            conversation_id,
            message: ServerMessage::MessagesRead { conversation_id, user_id },
            skip_user_id: Some(user_id),
        });

        Ok(())
    }

    pub async fn get_unread_count(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, error::SystemError> {
        self.conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        self.unread_repo.get(&user_id, &conversation_id).await
    }
}
