use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One emoji on one message, with everyone who reacted with it. The
/// emoji is unique within a message's reaction list; an entry with no
/// users is removed rather than kept empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MessageEntity {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub reply_to_id: Option<Uuid>,
    #[sqlx(json)]
    pub reactions: Vec<Reaction>,
    pub edited_at: Option<chrono::DateTime<chrono::Utc>>,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MessageEntity {
    /// Soft-deleted rows keep their content for audit; readers render a
    /// placeholder instead.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Toggles `user_id`'s reaction with `emoji`: removes the user if they
/// already reacted (dropping the emoji entry once empty), adds them
/// otherwise. Applying it twice with the same arguments restores the
/// original list.
pub fn toggle_reaction(reactions: &mut Vec<Reaction>, emoji: &str, user_id: &Uuid) {
    if let Some(idx) = reactions.iter().position(|r| r.emoji == emoji) {
        let entry = &mut reactions[idx];
        if let Some(pos) = entry.user_ids.iter().position(|id| id == user_id) {
            entry.user_ids.remove(pos);
            if entry.user_ids.is_empty() {
                reactions.remove(idx);
            }
        } else {
            entry.user_ids.push(*user_id);
        }
    } else {
        reactions.push(Reaction { emoji: emoji.to_string(), user_ids: vec![*user_id] });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let user = Uuid::now_v7();
        let mut reactions = Vec::new();

        toggle_reaction(&mut reactions, "👍", &user);
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].user_ids, vec![user]);

        toggle_reaction(&mut reactions, "👍", &user);
        assert!(reactions.is_empty());
    }

    #[test]
    fn toggle_is_its_own_inverse_with_other_reactors() {
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let mut reactions = Vec::new();

        toggle_reaction(&mut reactions, "👍", &alice);
        let before = reactions.clone();

        toggle_reaction(&mut reactions, "👍", &bob);
        toggle_reaction(&mut reactions, "👍", &bob);

        assert_eq!(reactions, before);
    }

    #[test]
    fn one_entry_per_emoji() {
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let mut reactions = Vec::new();

        toggle_reaction(&mut reactions, "🔥", &alice);
        toggle_reaction(&mut reactions, "🔥", &bob);

        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].user_ids, vec![alice, bob]);
    }

    #[test]
    fn user_may_hold_multiple_distinct_emoji() {
        let alice = Uuid::now_v7();
        let mut reactions = Vec::new();

        toggle_reaction(&mut reactions, "👍", &alice);
        toggle_reaction(&mut reactions, "❤️", &alice);

        assert_eq!(reactions.len(), 2);
    }

    #[test]
    fn removing_one_emoji_keeps_the_others() {
        let alice = Uuid::now_v7();
        let mut reactions = Vec::new();

        toggle_reaction(&mut reactions, "👍", &alice);
        toggle_reaction(&mut reactions, "❤️", &alice);
        toggle_reaction(&mut reactions, "👍", &alice);

        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].emoji, "❤️");
    }
}
