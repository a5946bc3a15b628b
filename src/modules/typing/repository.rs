use uuid::Uuid;

use crate::{api::error, modules::typing::schema::TypingSignalEntity};

/// Ephemeral per-(conversation, user) typing signals. `set_typing`
/// with `false` is the only explicit deletion path; stale rows are
/// filtered by readers, never reaped here.
#[async_trait::async_trait]
pub trait TypingRepository {
    async fn set_typing(
        &self,
        conversation_id: &Uuid,
        user_id: &Uuid,
        is_typing: bool,
    ) -> Result<(), error::SystemError>;

    /// All stored signals for the conversation, stale ones included.
    /// Reading must not mutate.
    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<TypingSignalEntity>, error::SystemError>;
}
