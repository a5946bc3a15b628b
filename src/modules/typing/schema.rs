use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Signals older than this are invisible to readers. Expiry is a
/// read-time filter, not a background sweep; a signal that ages out
/// simply stops showing up until refreshed or replaced.
pub const TYPING_LIVENESS_WINDOW_MS: i64 = 2_000;

#[derive(Debug, Clone, FromRow)]
pub struct TypingSignalEntity {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl TypingSignalEntity {
    pub fn is_live(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        (now - self.updated_at).num_milliseconds() <= TYPING_LIVENESS_WINDOW_MS
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TypingUser {
    pub user_id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn signal(age_ms: i64, now: chrono::DateTime<chrono::Utc>) -> TypingSignalEntity {
        TypingSignalEntity {
            conversation_id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            updated_at: now - Duration::milliseconds(age_ms),
        }
    }

    #[test]
    fn fresh_signal_is_live() {
        let now = Utc::now();
        assert!(signal(0, now).is_live(now));
        assert!(signal(1_500, now).is_live(now));
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let now = Utc::now();
        assert!(signal(2_000, now).is_live(now));
        assert!(!signal(2_001, now).is_live(now));
    }

    #[test]
    fn future_timestamp_counts_as_live() {
        // clock skew between writers must not hide a typer
        let now = Utc::now();
        assert!(signal(-500, now).is_live(now));
    }
}
