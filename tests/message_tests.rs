mod common;

use chatwave_backend::api::error::SystemError;
use chatwave_backend::modules::conversation::repository::ConversationRepository;
use common::{direct_conversation, group_conversation, register_user, stack};
use uuid::Uuid;

#[actix_web::test]
async fn send_fans_out_to_every_participant_except_the_sender() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let carol = register_user(&s.store, "carol").await;
    let conversation = group_conversation(&s, alice, "team", vec![bob, carol]).await;

    s.messages.send_message(alice, conversation, "hi".into(), None).await.unwrap();

    assert_eq!(s.conversations.get_unread_count(conversation, bob).await.unwrap(), 1);
    assert_eq!(s.conversations.get_unread_count(conversation, carol).await.unwrap(), 1);
    assert_eq!(s.conversations.get_unread_count(conversation, alice).await.unwrap(), 0);
}

#[actix_web::test]
async fn send_rejects_whitespace_only_content() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let result = s.messages.send_message(alice, conversation, "   \n\t".into(), None).await;

    assert!(matches!(result, Err(SystemError::BadRequest(_))));
    assert!(s.messages.get_messages(conversation).await.unwrap().is_empty());
}

#[actix_web::test]
async fn send_to_unknown_conversation_has_no_partial_effects() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;
    let bogus = Uuid::now_v7();

    let result = s.messages.send_message(alice, bogus, "hello?".into(), None).await;

    assert!(matches!(result, Err(SystemError::NotFound(_))));
    // no fan-out leaked into the conversation that does exist
    assert_eq!(s.conversations.get_unread_count(conversation, bob).await.unwrap(), 0);
}

#[actix_web::test]
async fn send_moves_the_last_message_pointer_and_timestamp() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let before = s.store.find_by_id(&conversation).await.unwrap().unwrap();

    let message =
        s.messages.send_message(alice, conversation, "hello".into(), None).await.unwrap();

    let after = s.store.find_by_id(&conversation).await.unwrap().unwrap();
    assert_eq!(after.last_message_id, Some(message.id));
    assert!(after.updated_at >= before.updated_at);
}

#[actix_web::test]
async fn messages_list_in_creation_order_and_keep_deleted_rows() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let first =
        s.messages.send_message(alice, conversation, "one".into(), None).await.unwrap();
    let second =
        s.messages.send_message(bob, conversation, "two".into(), None).await.unwrap();
    let third =
        s.messages.send_message(alice, conversation, "three".into(), None).await.unwrap();

    s.messages.delete_message(second.id, bob).await.unwrap();

    let listed = s.messages.get_messages(conversation).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    assert!(listed[1].is_deleted());
    // the row keeps its content; readers mask it
    assert_eq!(listed[1].content, "two");

    for window in listed.windows(2) {
        assert!(window[0].created_at <= window[1].created_at);
    }
}

#[actix_web::test]
async fn listing_an_unknown_conversation_fails() {
    let s = stack();

    let result = s.messages.get_messages(Uuid::now_v7()).await;

    assert!(matches!(result, Err(SystemError::NotFound(_))));
}

#[actix_web::test]
async fn edit_by_sender_updates_content_and_edit_timestamp() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let message =
        s.messages.send_message(alice, conversation, "helo".into(), None).await.unwrap();
    assert!(message.edited_at.is_none());

    let edited = s.messages.edit_message(message.id, alice, "hello".into()).await.unwrap();

    assert_eq!(edited.content, "hello");
    assert!(edited.edited_at.is_some());
}

#[actix_web::test]
async fn edit_by_non_sender_returns_the_unchanged_row() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let message =
        s.messages.send_message(alice, conversation, "mine".into(), None).await.unwrap();

    let result = s.messages.edit_message(message.id, bob, "hijacked".into()).await.unwrap();

    assert_eq!(result.content, "mine");
    assert!(result.edited_at.is_none());
}

#[actix_web::test]
async fn edit_of_a_deleted_message_is_a_noop() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let message =
        s.messages.send_message(alice, conversation, "gone".into(), None).await.unwrap();
    s.messages.delete_message(message.id, alice).await.unwrap();

    let result = s.messages.edit_message(message.id, alice, "resurrected".into()).await.unwrap();

    assert_eq!(result.content, "gone");
    assert!(result.is_deleted());
}

#[actix_web::test]
async fn delete_by_non_sender_returns_the_unchanged_row() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let message =
        s.messages.send_message(alice, conversation, "stay".into(), None).await.unwrap();

    let result = s.messages.delete_message(message.id, bob).await.unwrap();

    assert!(!result.is_deleted());
}

#[actix_web::test]
async fn editing_an_unknown_message_fails() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;

    let result = s.messages.edit_message(Uuid::now_v7(), alice, "anything".into()).await;

    assert!(matches!(result, Err(SystemError::NotFound(_))));
}

#[actix_web::test]
async fn reaction_toggle_is_its_own_inverse() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let message =
        s.messages.send_message(bob, conversation, "react to me".into(), None).await.unwrap();
    assert!(message.reactions.is_empty());

    let once = s.messages.react(message.id, "👍".into(), alice).await.unwrap();
    assert_eq!(once.reactions.len(), 1);
    assert_eq!(once.reactions[0].emoji, "👍");
    assert_eq!(once.reactions[0].user_ids, vec![alice]);

    let twice = s.messages.react(message.id, "👍".into(), alice).await.unwrap();
    assert!(twice.reactions.is_empty());
}

#[actix_web::test]
async fn reactions_share_one_entry_per_emoji() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let message =
        s.messages.send_message(alice, conversation, "popular".into(), None).await.unwrap();

    s.messages.react(message.id, "🔥".into(), alice).await.unwrap();
    let both = s.messages.react(message.id, "🔥".into(), bob).await.unwrap();

    assert_eq!(both.reactions.len(), 1);
    assert_eq!(both.reactions[0].user_ids, vec![alice, bob]);

    // one user may hold several distinct emoji at once
    let more = s.messages.react(message.id, "❤️".into(), alice).await.unwrap();
    assert_eq!(more.reactions.len(), 2);
}

#[actix_web::test]
async fn two_user_exchange_ends_in_the_expected_state() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    s.messages.send_message(alice, conversation, "hello".into(), None).await.unwrap();
    let reply = s.messages.send_message(bob, conversation, "hi".into(), None).await.unwrap();
    s.messages.react(reply.id, "👍".into(), alice).await.unwrap();
    s.messages.delete_message(reply.id, bob).await.unwrap();

    let listed = s.messages.get_messages(conversation).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].content, "hello");

    // second message is soft-deleted, reactions retained, content hidden by readers
    assert!(listed[1].is_deleted());
    assert_eq!(listed[1].reactions.len(), 1);

    // each side still owes a read acknowledgement for the other's message
    assert_eq!(s.conversations.get_unread_count(conversation, alice).await.unwrap(), 1);
    assert_eq!(s.conversations.get_unread_count(conversation, bob).await.unwrap(), 1);
}

#[actix_web::test]
async fn reply_reference_is_preserved() {
    let s = stack();
    let alice = register_user(&s.store, "alice").await;
    let bob = register_user(&s.store, "bob").await;
    let conversation = direct_conversation(&s, alice, bob).await;

    let original =
        s.messages.send_message(alice, conversation, "question".into(), None).await.unwrap();
    let reply = s
        .messages
        .send_message(bob, conversation, "answer".into(), Some(original.id))
        .await
        .unwrap();

    assert_eq!(reply.reply_to_id, Some(original.id));
}
