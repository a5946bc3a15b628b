use actix::Addr;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::conversation::repository::ConversationRepository;
use crate::modules::realtime::events::BroadcastToRoom;
use crate::modules::realtime::message::ServerMessage;
use crate::modules::realtime::server::WebSocketServer;
use crate::modules::typing::repository::TypingRepository;
use crate::modules::typing::schema::TypingUser;
use crate::modules::user::repository::UserRepository;

#[derive(Clone)]
pub struct TypingService<T, C, U>
where
    T: TypingRepository + Send + Sync + 'static,
    C: ConversationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    typing_repo: Arc<T>,
    conversation_repo: Arc<C>,
    user_repo: Arc<U>,
    ws_server: Arc<Addr<WebSocketServer>>,
}

impl<T, C, U> TypingService<T, C, U>
where
    T: TypingRepository + Send + Sync + 'static,
    C: ConversationRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        typing_repo: Arc<T>,
        conversation_repo: Arc<C>,
        user_repo: Arc<U>,
        ws_server: Arc<Addr<WebSocketServer>>,
    ) -> Self {
        TypingService { typing_repo, conversation_repo, user_repo, ws_server }
    }

    pub async fn set_typing(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        is_typing: bool,
    ) -> Result<(), error::SystemError> {
        self.conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        self.typing_repo.set_typing(&conversation_id, &user_id, is_typing).await?;

        let message = if is_typing {
            ServerMessage::UserTyping { conversation_id, user_id }
        } else {
            ServerMessage::UserStoppedTyping { conversation_id, user_id }
        };
        self.ws_server.do_send(BroadcastToRoom {
            conversation_id,
            message,
            skip_user_id: Some(user_id),
        });

        Ok(())
    }

    /// Who is typing right now. Filters by the liveness window at read
    /// time; stale rows stay in the store untouched.
    pub async fn active_typers(
        &self,
        conversation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<TypingUser>, error::SystemError> {
        self.conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        let signals = self.typing_repo.find_by_conversation(&conversation_id).await?;
        let live: Vec<Uuid> =
            signals.iter().filter(|s| s.is_live(now)).map(|s| s.user_id).collect();

        self.resolve_names(&live).await
    }

    /// The same projection across every conversation the user is in.
    /// Conversations with nobody typing map to an empty list; dropping
    /// the requester's own signal is the rendering client's policy.
    pub async fn active_typers_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<HashMap<Uuid, Vec<TypingUser>>, error::SystemError> {
        let conversation_ids = self.conversation_repo.find_ids_for_user(&user_id).await?;

        let mut result = HashMap::with_capacity(conversation_ids.len());
        for conversation_id in conversation_ids {
            let signals = self.typing_repo.find_by_conversation(&conversation_id).await?;
            let live: Vec<Uuid> =
                signals.iter().filter(|s| s.is_live(now)).map(|s| s.user_id).collect();

            result.insert(conversation_id, self.resolve_names(&live).await?);
        }

        Ok(result)
    }

    async fn resolve_names(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<TypingUser>, error::SystemError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.user_repo.find_by_ids(user_ids).await?;
        let names: HashMap<Uuid, String> =
            users.into_iter().map(|u| (u.id, u.display_name)).collect();

        // keep signal order; skip ids with no user row behind them
        Ok(user_ids
            .iter()
            .filter_map(|id| names.get(id).map(|name| TypingUser {
                user_id: *id,
                name: name.clone(),
            }))
            .collect())
    }
}
