#![allow(dead_code)]
use actix::Actor;
use std::sync::Arc;
use uuid::Uuid;

use chatwave_backend::modules::conversation::schema::ConversationType;
use chatwave_backend::modules::conversation::service::ConversationService;
use chatwave_backend::modules::memory::MemStore;
use chatwave_backend::modules::message::service::MessageService;
use chatwave_backend::modules::realtime::server::WebSocketServer;
use chatwave_backend::modules::typing::service::TypingService;
use chatwave_backend::modules::user::model::SyncProfile;
use chatwave_backend::modules::user::repository::UserRepository;

/// Full service stack over the in-memory backend, with a live delivery
/// actor. Must be built inside an actix runtime.
pub struct TestStack {
    pub store: MemStore,
    pub conversations: ConversationService<MemStore, MemStore>,
    pub messages: MessageService<MemStore, MemStore>,
    pub typing: TypingService<MemStore, MemStore, MemStore>,
}

pub fn stack() -> TestStack {
    let store = MemStore::new();
    let ws_server = Arc::new(WebSocketServer::new().start());

    let conversations = ConversationService::with_dependencies(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        ws_server.clone(),
    );
    let messages = MessageService::with_dependencies(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        ws_server.clone(),
    );
    let typing = TypingService::with_dependencies(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        ws_server,
    );

    TestStack { store, conversations, messages, typing }
}

/// Registers a user through the profile-sync path and returns the
/// internal id.
pub async fn register_user(store: &MemStore, name: &str) -> Uuid {
    store
        .sync_profile(&SyncProfile {
            external_id: format!("ext_{name}"),
            display_name: name.to_string(),
            avatar_url: None,
            email: format!("{name}@example.com"),
        })
        .await
        .unwrap()
}

/// Direct conversation between two users, created through the service.
pub async fn direct_conversation(stack: &TestStack, a: Uuid, b: Uuid) -> Uuid {
    stack
        .conversations
        .create_conversation(ConversationType::Direct, None, vec![b], a)
        .await
        .unwrap()
        .conversation_id
}

pub async fn group_conversation(
    stack: &TestStack,
    creator: Uuid,
    name: &str,
    members: Vec<Uuid>,
) -> Uuid {
    stack
        .conversations
        .create_conversation(ConversationType::Group, Some(name.to_string()), members, creator)
        .await
        .unwrap()
        .conversation_id
}
