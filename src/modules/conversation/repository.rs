use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::{
        model::{ConversationDetail, ConversationOverview},
        schema::ConversationEntity,
    },
};

/// Conversation directory. Implementations own their transactional
/// boundary: every method is one atomic unit against the backing store,
/// so the Postgres and in-memory backends share a single contract.
#[async_trait::async_trait]
pub trait ConversationRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    async fn find_detail(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationDetail>, error::SystemError>;

    /// Returns the existing direct conversation for the pair, in either
    /// argument order, or creates it. Two concurrent callers for the same
    /// pair must resolve to the same row.
    async fn resolve_or_create_direct(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
    ) -> Result<ConversationEntity, error::SystemError>;

    /// Groups are never deduplicated; distinct groups may share a
    /// member set.
    async fn create_group(
        &self,
        name: &str,
        member_ids: &[Uuid],
    ) -> Result<ConversationEntity, error::SystemError>;

    async fn find_all_for_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<ConversationOverview>, error::SystemError>;

    async fn find_ids_for_user(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError>;

    async fn participant_ids(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<Uuid>, error::SystemError>;
}

/// Per-(user, conversation) unread bookkeeping. An absent row reads as
/// zero: no unread activity yet.
#[async_trait::async_trait]
pub trait UnreadRepository {
    /// Adds one, creating the row at 1 if absent.
    async fn increment(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<(), error::SystemError>;

    /// Resets to zero; no-op if the row does not exist.
    async fn reset(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<(), error::SystemError>;

    async fn get(
        &self,
        user_id: &Uuid,
        conversation_id: &Uuid,
    ) -> Result<i64, error::SystemError>;
}
