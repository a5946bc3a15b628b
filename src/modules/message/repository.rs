use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{model::InsertMessage, schema::MessageEntity},
};

/// Ordered, mutable-with-audit message log. Every method is one atomic
/// unit against the backing store; `create` in particular must never
/// leave a message visible without its unread fan-out.
#[async_trait::async_trait]
pub trait MessageRepository {
    /// Appends the message, moves the conversation's last-message
    /// pointer and timestamp, and increments the unread counter of
    /// every participant other than the sender (creating rows at 1).
    /// Fails with NotFound, with no partial effects, when the
    /// conversation does not exist.
    async fn create(&self, message: &InsertMessage)
        -> Result<MessageEntity, error::SystemError>;

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    /// Ascending by creation time, id as tiebreak (v7 ids preserve
    /// insertion order). Soft-deleted rows are included.
    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    /// Applies only when `requester_id` is the sender and the row is
    /// not soft-deleted; otherwise returns the row unchanged. `None`
    /// means the id does not exist.
    async fn edit(
        &self,
        message_id: &Uuid,
        requester_id: &Uuid,
        content: &str,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    /// Same ownership rule as `edit`; sets the soft-delete timestamp.
    async fn soft_delete(
        &self,
        message_id: &Uuid,
        requester_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    /// Reaction toggle; `None` when the message does not exist.
    async fn toggle_reaction(
        &self,
        message_id: &Uuid,
        emoji: &str,
        user_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError>;
}
