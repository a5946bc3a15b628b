mod common;

use chatwave_backend::modules::user::model::SyncProfile;
use chatwave_backend::modules::user::repository::UserRepository;
use common::{register_user, stack};

#[actix_web::test]
async fn sync_keeps_the_internal_id_stable() {
    let s = stack();
    let first = register_user(&s.store, "alice").await;
    let second = register_user(&s.store, "alice").await;

    assert_eq!(first, second);
    assert_eq!(s.store.find_all().await.unwrap().len(), 1);
}

#[actix_web::test]
async fn sync_updates_profile_fields() {
    let s = stack();
    let id = register_user(&s.store, "alice").await;

    s.store
        .sync_profile(&SyncProfile {
            external_id: "ext_alice".to_string(),
            display_name: "Alice L.".to_string(),
            avatar_url: Some("https://cdn.example.com/a.png".to_string()),
            email: "alice@example.com".to_string(),
        })
        .await
        .unwrap();

    let user = s.store.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(user.display_name, "Alice L.");
    assert_eq!(user.avatar_url.as_deref(), Some("https://cdn.example.com/a.png"));
}

#[actix_web::test]
async fn sync_marks_every_other_user_offline() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;

    // bob synced last, so bob is the one active session
    let alice_row = s.store.find_by_id(&alice).await.unwrap().unwrap();
    let bob_row = s.store.find_by_id(&bob).await.unwrap().unwrap();
    assert!(!alice_row.is_online);
    assert!(bob_row.is_online);

    register_user(&s.store, "alice").await;

    let alice_row = s.store.find_by_id(&alice).await.unwrap().unwrap();
    let bob_row = s.store.find_by_id(&bob).await.unwrap().unwrap();
    assert!(alice_row.is_online);
    assert!(!bob_row.is_online);
}

#[actix_web::test]
async fn set_online_stamps_last_seen() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let synced_at = s.store.find_by_id(&alice).await.unwrap().unwrap().last_seen;

    s.store.set_online("ext_alice", false).await.unwrap();

    let user = s.store.find_by_id(&alice).await.unwrap().unwrap();
    assert!(!user.is_online);
    assert!(user.last_seen >= synced_at);
}

#[actix_web::test]
async fn set_online_for_unknown_external_id_is_a_silent_noop() {
    let s = stack();
    register_user(&s.store, "alice").await;

    // a heartbeat racing the first sync must not fail
    s.store.set_online("ext_nobody", true).await.unwrap();

    assert_eq!(s.store.find_all().await.unwrap().len(), 1);
}
