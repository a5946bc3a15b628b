use actix_web::{delete, patch, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        conversation::repository_pg::ConversationPgRepository,
        message::{
            model::{EditMessageRequest, ReactionRequest, SendMessageRequest},
            repository_pg::MessageRepositoryPg,
            schema::MessageEntity,
            service::MessageService,
        },
        user::service::UserService,
    },
    utils::ValidatedJson,
};

pub type MessageSvc = MessageService<MessageRepositoryPg, ConversationPgRepository>;

#[post("/")]
pub async fn send_message(
    message_service: web::Data<MessageSvc>,
    user_service: web::Data<UserService>,
    body: ValidatedJson<SendMessageRequest>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let sender = user_service.require_by_external_id(&claims.sub).await?;

    let body = body.0;
    let message = message_service
        .send_message(sender.id, body.conversation_id, body.content, body.reply_to_id)
        .await?;

    Ok(success::Success::created(Some(message)).message("Message sent successfully"))
}

#[patch("/{message_id}")]
pub async fn edit_message(
    message_service: web::Data<MessageSvc>,
    user_service: web::Data<UserService>,
    message_id: web::Path<Uuid>,
    body: ValidatedJson<EditMessageRequest>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    let message =
        message_service.edit_message(*message_id, user.id, body.0.content).await?;

    Ok(success::Success::ok(Some(message)).message("Message updated"))
}

#[delete("/{message_id}")]
pub async fn delete_message(
    message_service: web::Data<MessageSvc>,
    user_service: web::Data<UserService>,
    message_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    let message = message_service.delete_message(*message_id, user.id).await?;

    Ok(success::Success::ok(Some(message)).message("Message deleted"))
}

#[post("/{message_id}/reactions")]
pub async fn react_to_message(
    message_service: web::Data<MessageSvc>,
    user_service: web::Data<UserService>,
    message_id: web::Path<Uuid>,
    body: ValidatedJson<ReactionRequest>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    let message = message_service.react(*message_id, body.0.emoji, user.id).await?;

    Ok(success::Success::ok(Some(message)).message("Reaction toggled"))
}
