/// In-memory storage backend.
///
/// Implements every repository trait over one shared state behind a
/// `RwLock`. Each operation takes the lock exactly once, so the
/// transaction-per-operation contract of the Postgres backend holds
/// here too: a message is never observable without its unread fan-out.
/// The integration test suite runs the full service stack on top of
/// this backend.
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::api::error;
use crate::modules::conversation::model::{
    ConversationDetail, ConversationOverview, LastMessagePreview,
};
use crate::modules::conversation::repository::{ConversationRepository, UnreadRepository};
use crate::modules::conversation::schema::{direct_key, ConversationEntity, ConversationType};
use crate::modules::message::model::InsertMessage;
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::{toggle_reaction, MessageEntity};
use crate::modules::typing::repository::TypingRepository;
use crate::modules::typing::schema::TypingSignalEntity;
use crate::modules::user::model::SyncProfile;
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::UserEntity;

struct StoredConversation {
    entity: ConversationEntity,
    participants: Vec<Uuid>,
}

#[derive(Default)]
struct MemState {
    users: HashMap<Uuid, UserEntity>,
    conversations: HashMap<Uuid, StoredConversation>,
    /// Insertion-ordered; creation-time sort over this is stable.
    messages: Vec<MessageEntity>,
    /// (user_id, conversation_id) -> unread count
    unreads: HashMap<(Uuid, Uuid), i64>,
    /// (conversation_id, user_id) -> last typing assertion
    typing: HashMap<(Uuid, Uuid), chrono::DateTime<chrono::Utc>>,
}

#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<RwLock<MemState>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemState> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemState> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn overview_for(
    state: &MemState,
    stored: &StoredConversation,
    user_id: &Uuid,
) -> ConversationOverview {
    let entity = &stored.entity;

    let last_message = entity.last_message_id.and_then(|message_id| {
        state.messages.iter().find(|m| m.id == message_id).map(|m| LastMessagePreview {
            content: m.content.clone(),
            sender_id: m.sender_id,
            created_at: m.created_at,
            deleted: m.is_deleted(),
        })
    });

    ConversationOverview {
        conversation_id: entity.id,
        _type: entity._type.clone(),
        name: entity.name.clone(),
        unread_count: state.unreads.get(&(*user_id, entity.id)).copied().unwrap_or(0),
        last_message,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

#[async_trait::async_trait]
impl ConversationRepository for MemStore {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let state = self.read();
        Ok(state.conversations.get(conversation_id).map(|c| c.entity.clone()))
    }

    async fn find_detail(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationDetail>, error::SystemError> {
        let state = self.read();
        Ok(state.conversations.get(conversation_id).map(|c| ConversationDetail {
            conversation_id: c.entity.id,
            _type: c.entity._type.clone(),
            name: c.entity.name.clone(),
            participants: c.participants.clone(),
            last_message_id: c.entity.last_message_id,
            created_at: c.entity.created_at,
            updated_at: c.entity.updated_at,
        }))
    }

    async fn resolve_or_create_direct(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        let key = direct_key(user_a, user_b);

        let mut state = self.write();

        if let Some(existing) = state
            .conversations
            .values()
            .find(|c| c.entity.direct_key.as_deref() == Some(key.as_str()))
        {
            return Ok(existing.entity.clone());
        }

        let now = Utc::now();
        let entity = ConversationEntity {
            id: Uuid::now_v7(),
            _type: ConversationType::Direct,
            name: None,
            direct_key: Some(key),
            last_message_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut participants = vec![*user_a];
        if user_b != user_a {
            participants.push(*user_b);
        }

        state.conversations.insert(
            entity.id,
            StoredConversation { entity: entity.clone(), participants },
        );

        Ok(entity)
    }

    async fn create_group(
        &self,
        name: &str,
        member_ids: &[Uuid],
    ) -> Result<ConversationEntity, error::SystemError> {
        let now = Utc::now();
        let entity = ConversationEntity {
            id: Uuid::now_v7(),
            _type: ConversationType::Group,
            name: Some(name.to_string()),
            direct_key: None,
            last_message_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.write();
        state.conversations.insert(
            entity.id,
            StoredConversation { entity: entity.clone(), participants: member_ids.to_vec() },
        );

        Ok(entity)
    }

    async fn find_all_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationOverview>, error::SystemError> {
        let state = self.read();

        let mut overviews: Vec<ConversationOverview> = state
            .conversations
            .values()
            .filter(|c| c.participants.contains(user_id))
            .map(|c| overview_for(&state, c, user_id))
            .collect();

        overviews.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(overviews)
    }

    async fn find_ids_for_user(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        let state = self.read();
        Ok(state
            .conversations
            .values()
            .filter(|c| c.participants.contains(user_id))
            .map(|c| c.entity.id)
            .collect())
    }

    async fn participant_ids(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<Uuid>, error::SystemError> {
        let state = self.read();
        Ok(state
            .conversations
            .get(conversation_id)
            .map(|c| c.participants.clone())
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl UnreadRepository for MemStore {
    async fn increment(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        let mut state = self.write();
        *state.unreads.entry((*user_id, *conversation_id)).or_insert(0) += 1;
        Ok(())
    }

    async fn reset(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        let mut state = self.write();
        if let Some(count) = state.unreads.get_mut(&(*user_id, *conversation_id)) {
            *count = 0;
        }
        Ok(())
    }

    async fn get(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let state = self.read();
        Ok(state.unreads.get(&(*user_id, *conversation_id)).copied().unwrap_or(0))
    }
}

#[async_trait::async_trait]
impl MessageRepository for MemStore {
    async fn create(
        &self,
        message: &InsertMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        let mut state = self.write();

        let participants = state
            .conversations
            .get(&message.conversation_id)
            .map(|c| c.participants.clone())
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        let now = Utc::now();
        let entity = MessageEntity {
            id: Uuid::now_v7(),
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            reply_to_id: message.reply_to_id,
            reactions: Vec::new(),
            edited_at: None,
            deleted_at: None,
            created_at: now,
        };

        state.messages.push(entity.clone());

        if let Some(stored) = state.conversations.get_mut(&message.conversation_id) {
            stored.entity.last_message_id = Some(entity.id);
            stored.entity.updated_at = now;
        }

        for participant in participants {
            if participant != message.sender_id {
                *state.unreads.entry((participant, message.conversation_id)).or_insert(0) += 1;
            }
        }

        Ok(entity)
    }

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let state = self.read();
        Ok(state.messages.iter().find(|m| m.id == *message_id).cloned())
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let state = self.read();
        let mut messages: Vec<MessageEntity> = state
            .messages
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .cloned()
            .collect();

        // stable sort keeps insertion order for equal timestamps
        messages.sort_by_key(|m| m.created_at);

        Ok(messages)
    }

    async fn edit(
        &self,
        message_id: &Uuid,
        requester_id: &Uuid,
        content: &str,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let mut state = self.write();

        let Some(message) = state.messages.iter_mut().find(|m| m.id == *message_id) else {
            return Ok(None);
        };

        if message.sender_id == *requester_id && message.deleted_at.is_none() {
            message.content = content.to_string();
            message.edited_at = Some(Utc::now());
        }

        Ok(Some(message.clone()))
    }

    async fn soft_delete(
        &self,
        message_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let mut state = self.write();

        let Some(message) = state.messages.iter_mut().find(|m| m.id == *message_id) else {
            return Ok(None);
        };

        if message.sender_id == *requester_id && message.deleted_at.is_none() {
            message.deleted_at = Some(Utc::now());
        }

        Ok(Some(message.clone()))
    }

    async fn toggle_reaction(
        &self,
        message_id: &Uuid,
        emoji: &str,
        user_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let mut state = self.write();

        let Some(message) = state.messages.iter_mut().find(|m| m.id == *message_id) else {
            return Ok(None);
        };

        toggle_reaction(&mut message.reactions, emoji, user_id);

        Ok(Some(message.clone()))
    }
}

#[async_trait::async_trait]
impl TypingRepository for MemStore {
    async fn set_typing(
        &self,
        conversation_id: &Uuid,
        user_id: &Uuid,
        is_typing: bool,
    ) -> Result<(), error::SystemError> {
        let mut state = self.write();

        if is_typing {
            state.typing.insert((*conversation_id, *user_id), Utc::now());
        } else {
            state.typing.remove(&(*conversation_id, *user_id));
        }

        Ok(())
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<TypingSignalEntity>, error::SystemError> {
        let state = self.read();
        Ok(state
            .typing
            .iter()
            .filter(|((cid, _), _)| cid == conversation_id)
            .map(|((cid, uid), ts)| TypingSignalEntity {
                conversation_id: *cid,
                user_id: *uid,
                updated_at: *ts,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl UserRepository for MemStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let state = self.read();
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let state = self.read();
        Ok(state.users.values().find(|u| u.external_id == external_id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, error::SystemError> {
        let state = self.read();
        Ok(ids.iter().filter_map(|id| state.users.get(id).cloned()).collect())
    }

    async fn find_all(&self) -> Result<Vec<UserEntity>, error::SystemError> {
        let state = self.read();
        let mut users: Vec<UserEntity> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(users)
    }

    async fn sync_profile(&self, profile: &SyncProfile) -> Result<Uuid, error::SystemError> {
        let mut state = self.write();
        let now = Utc::now();

        let existing_id = state
            .users
            .values()
            .find(|u| u.external_id == profile.external_id)
            .map(|u| u.id);

        let id = if let Some(id) = existing_id {
            if let Some(user) = state.users.get_mut(&id) {
                user.display_name = profile.display_name.clone();
                user.avatar_url = profile.avatar_url.clone();
                user.email = profile.email.clone();
                user.is_online = true;
                user.last_seen = Some(now);
                user.updated_at = now;
            }
            id
        } else {
            let user = UserEntity {
                id: Uuid::now_v7(),
                external_id: profile.external_id.clone(),
                display_name: profile.display_name.clone(),
                avatar_url: profile.avatar_url.clone(),
                email: profile.email.clone(),
                is_online: true,
                last_seen: Some(now),
                created_at: now,
                updated_at: now,
            };
            let id = user.id;
            state.users.insert(id, user);
            id
        };

        // single-active-session policy, same lock as the upsert
        for user in state.users.values_mut() {
            if user.id != id {
                user.is_online = false;
            }
        }

        Ok(id)
    }

    async fn set_online(
        &self,
        external_id: &str,
        online: bool,
    ) -> Result<(), error::SystemError> {
        let mut state = self.write();

        if let Some(user) = state.users.values_mut().find(|u| u.external_id == external_id) {
            let now = Utc::now();
            user.is_online = online;
            user.last_seen = Some(now);
            user.updated_at = now;
        }

        Ok(())
    }
}
