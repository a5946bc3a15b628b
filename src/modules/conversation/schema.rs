#![allow(dead_code)]
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Clone, Type, Serialize, Deserialize)]
#[sqlx(type_name = "conversation_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    Direct,
    Group,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationEntity {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub _type: ConversationType,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub direct_key: Option<String>,
    pub last_message_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ConversationEntity {
    pub fn is_group(&self) -> bool {
        self._type == ConversationType::Group
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ParticipantEntity {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// Canonical representation of an unordered participant pair. Both
/// argument orders map to the same key, which is what makes 1:1
/// conversation identity idempotent (and, with a unique index on the
/// column, race-safe).
pub fn direct_key(user_a: &Uuid, user_b: &Uuid) -> String {
    let (lo, hi) = if user_a <= user_b { (user_a, user_b) } else { (user_b, user_a) };
    format!("{lo}:{hi}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_is_order_independent() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(direct_key(&a, &b), direct_key(&b, &a));
    }

    #[test]
    fn direct_key_distinguishes_pairs() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();
        assert_ne!(direct_key(&a, &b), direct_key(&a, &c));
    }

    #[test]
    fn direct_key_handles_self_pair() {
        let a = Uuid::now_v7();
        assert_eq!(direct_key(&a, &a), format!("{a}:{a}"));
    }
}
