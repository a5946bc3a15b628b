mod common;

use chatwave_backend::api::error::SystemError;
use chatwave_backend::modules::typing::repository::TypingRepository;
use chrono::{Duration, Utc};
use common::{direct_conversation, register_user, stack};
use uuid::Uuid;

#[actix_web::test]
async fn typing_user_shows_up_with_their_name() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    s.typing.set_typing(conversation, bob, true).await.unwrap();

    let typers = s.typing.active_typers(conversation, Utc::now()).await.unwrap();
    assert_eq!(typers.len(), 1);
    assert_eq!(typers[0].user_id, bob);
    assert_eq!(typers[0].name, "bob");
}

#[actix_web::test]
async fn stale_signals_age_out_without_any_cleanup_call() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    s.typing.set_typing(conversation, bob, true).await.unwrap();

    let now = Utc::now();
    assert_eq!(s.typing.active_typers(conversation, now).await.unwrap().len(), 1);

    // simulated clock: past the liveness window the projection is empty
    let later = now + Duration::milliseconds(3_000);
    assert!(s.typing.active_typers(conversation, later).await.unwrap().is_empty());

    // the stale row is filtered, not deleted
    let stored = s.store.find_by_conversation(&conversation).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[actix_web::test]
async fn reading_does_not_mutate_signals() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    s.typing.set_typing(conversation, bob, true).await.unwrap();
    let before = s.store.find_by_conversation(&conversation).await.unwrap();

    let later = Utc::now() + Duration::seconds(10);
    s.typing.active_typers(conversation, later).await.unwrap();

    let after = s.store.find_by_conversation(&conversation).await.unwrap();
    assert_eq!(before.len(), after.len());
    assert_eq!(before[0].updated_at, after[0].updated_at);
}

#[actix_web::test]
async fn stopping_typing_deletes_the_signal() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    s.typing.set_typing(conversation, bob, true).await.unwrap();
    s.typing.set_typing(conversation, bob, false).await.unwrap();

    assert!(s.store.find_by_conversation(&conversation).await.unwrap().is_empty());
    assert!(s.typing.active_typers(conversation, Utc::now()).await.unwrap().is_empty());
}

#[actix_web::test]
async fn refreshing_extends_the_window() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    s.typing.set_typing(conversation, bob, true).await.unwrap();
    let first = s.store.find_by_conversation(&conversation).await.unwrap()[0].updated_at;

    s.typing.set_typing(conversation, bob, true).await.unwrap();
    let second = s.store.find_by_conversation(&conversation).await.unwrap()[0].updated_at;

    assert!(second >= first);
    // still one signal per (conversation, user)
    assert_eq!(s.store.find_by_conversation(&conversation).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn per_user_projection_covers_every_conversation() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let carol = register_user(&s.store, "carol").await;

    let with_bob = direct_conversation(&s, alice, bob).await;
    let with_carol = direct_conversation(&s, alice, carol).await;

    s.typing.set_typing(with_bob, bob, true).await.unwrap();

    let map = s.typing.active_typers_for_user(alice, Utc::now()).await.unwrap();

    assert_eq!(map.len(), 2);
    assert_eq!(map[&with_bob].len(), 1);
    assert_eq!(map[&with_bob][0].user_id, bob);
    assert!(map[&with_carol].is_empty());
}

#[actix_web::test]
async fn typing_in_an_unknown_conversation_fails() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;

    let result = s.typing.set_typing(Uuid::now_v7(), alice, true).await;

    assert!(matches!(result, Err(SystemError::NotFound(_))));
}
