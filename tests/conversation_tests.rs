mod common;

use chatwave_backend::api::error::SystemError;
use chatwave_backend::modules::conversation::schema::ConversationType;
use common::{direct_conversation, group_conversation, register_user, stack};
use uuid::Uuid;

#[actix_web::test]
async fn direct_conversation_is_deduplicated_in_either_order() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;

    let first = direct_conversation(&s, alice, bob).await;
    let second = direct_conversation(&s, bob, alice).await;

    assert_eq!(first, second);

    // exactly one row exists for the pair
    let alices = s.conversations.get_by_user_id(alice).await.unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].conversation_id, first);
}

#[actix_web::test]
async fn groups_with_identical_membership_stay_distinct() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;

    let g1 = group_conversation(&s, alice, "planning", vec![bob]).await;
    let g2 = group_conversation(&s, alice, "planning", vec![bob]).await;

    assert_ne!(g1, g2);
}

#[actix_web::test]
async fn group_requires_a_name() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;

    let result = s
        .conversations
        .create_conversation(ConversationType::Group, Some("   ".to_string()), vec![bob], alice)
        .await;

    assert!(matches!(result, Err(SystemError::BadRequest(_))));

    let result = s
        .conversations
        .create_conversation(ConversationType::Group, None, vec![bob], alice)
        .await;

    assert!(matches!(result, Err(SystemError::BadRequest(_))));
}

#[actix_web::test]
async fn group_membership_includes_creator_once() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let carol = register_user(&s.store, "carol").await;

    // creator listed twice in the request, plus a duplicate member
    let id = group_conversation(&s, alice, "team", vec![alice, bob, bob, carol]).await;

    let detail = s.conversations.get_by_id(id).await.unwrap();
    assert_eq!(detail.participants, vec![alice, bob, carol]);
}

#[actix_web::test]
async fn get_by_id_reports_not_found() {
    let s = stack();

    let result = s.conversations.get_by_id(Uuid::now_v7()).await;

    assert!(matches!(result, Err(SystemError::NotFound(_))));
}

#[actix_web::test]
async fn overview_carries_unread_count_and_last_message_preview() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    s.messages.send_message(alice, conversation, "first".into(), None).await.unwrap();
    s.messages.send_message(alice, conversation, "second".into(), None).await.unwrap();

    let bobs = s.conversations.get_by_user_id(bob).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].unread_count, 2);

    let preview = bobs[0].last_message.as_ref().expect("preview should follow the pointer");
    assert_eq!(preview.content, "second");
    assert_eq!(preview.sender_id, alice);
    assert!(!preview.deleted);

    // the sender has nothing unread
    let alices = s.conversations.get_by_user_id(alice).await.unwrap();
    assert_eq!(alices[0].unread_count, 0);
}

#[actix_web::test]
async fn overview_preview_flags_deleted_last_message() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let message =
        s.messages.send_message(alice, conversation, "oops".into(), None).await.unwrap();
    s.messages.delete_message(message.id, alice).await.unwrap();

    let bobs = s.conversations.get_by_user_id(bob).await.unwrap();
    let preview = bobs[0].last_message.as_ref().unwrap();
    assert!(preview.deleted);
    // content is retained for audit; masking is the renderer's job
    assert_eq!(preview.content, "oops");
}

#[actix_web::test]
async fn conversations_are_ordered_by_recency() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let carol = register_user(&s.store, "carol").await;

    let with_bob = direct_conversation(&s, alice, bob).await;
    let with_carol = direct_conversation(&s, alice, carol).await;

    s.messages.send_message(bob, with_bob, "newest activity".into(), None).await.unwrap();

    let overviews = s.conversations.get_by_user_id(alice).await.unwrap();
    assert_eq!(overviews.len(), 2);
    assert_eq!(overviews[0].conversation_id, with_bob);
    assert_eq!(overviews[1].conversation_id, with_carol);
}

#[actix_web::test]
async fn acknowledge_read_resets_and_stays_at_zero() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    s.messages.send_message(alice, conversation, "hi".into(), None).await.unwrap();
    assert_eq!(s.conversations.get_unread_count(conversation, bob).await.unwrap(), 1);

    s.conversations.acknowledge_read(conversation, bob).await.unwrap();
    assert_eq!(s.conversations.get_unread_count(conversation, bob).await.unwrap(), 0);

    // idempotent
    s.conversations.acknowledge_read(conversation, bob).await.unwrap();
    assert_eq!(s.conversations.get_unread_count(conversation, bob).await.unwrap(), 0);
}

#[actix_web::test]
async fn acknowledge_read_without_counter_row_is_a_noop() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    // nothing was ever sent; no row exists yet
    s.conversations.acknowledge_read(conversation, bob).await.unwrap();
    assert_eq!(s.conversations.get_unread_count(conversation, bob).await.unwrap(), 0);
}

#[actix_web::test]
async fn acknowledge_read_on_unknown_conversation_fails() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;

    let result = s.conversations.acknowledge_read(Uuid::now_v7(), alice).await;

    assert!(matches!(result, Err(SystemError::NotFound(_))));
}
