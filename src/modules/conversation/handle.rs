use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        conversation::{
            model::{ConversationDetail, ConversationOverview, NewConversation},
            repository_pg::{ConversationPgRepository, UnreadPgRepository},
            service::ConversationService,
        },
        message::{handle::MessageSvc, schema::MessageEntity},
        user::service::UserService,
    },
    utils::ValidatedJson,
};

pub type ConversationSvc = ConversationService<ConversationPgRepository, UnreadPgRepository>;

#[get("/")]
pub async fn get_conversations(
    conversation_svc: web::Data<ConversationSvc>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ConversationOverview>>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    let conversations = conversation_svc.get_by_user_id(user.id).await?;

    Ok(success::Success::ok(Some(conversations)).message("Successfully retrieved conversations"))
}

#[post("/")]
pub async fn create_conversation(
    conversation_svc: web::Data<ConversationSvc>,
    user_service: web::Data<UserService>,
    body: ValidatedJson<NewConversation>,
    req: HttpRequest,
) -> Result<success::Success<ConversationDetail>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    let body = body.0;
    let conversation = conversation_svc
        .create_conversation(body._type, body.name, body.member_ids, user.id)
        .await?;

    Ok(success::Success::ok(Some(conversation)).message("Successfully created conversation"))
}

#[get("/{conversation_id}")]
pub async fn get_conversation(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
) -> Result<success::Success<ConversationDetail>, error::Error> {
    let conversation = conversation_svc.get_by_id(*conversation_id).await?;

    Ok(success::Success::ok(Some(conversation)).message("Successfully retrieved conversation"))
}

#[post("/{conversation_id}/read")]
pub async fn acknowledge_read(
    conversation_svc: web::Data<ConversationSvc>,
    user_service: web::Data<UserService>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    conversation_svc.acknowledge_read(*conversation_id, user.id).await?;

    Ok(success::Success::no_content())
}

#[get("/{conversation_id}/unread")]
pub async fn get_unread_count(
    conversation_svc: web::Data<ConversationSvc>,
    user_service: web::Data<UserService>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<i64>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    let count = conversation_svc.get_unread_count(*conversation_id, user.id).await?;

    Ok(success::Success::ok(Some(count)).message("Successfully retrieved unread count"))
}

#[get("/{conversation_id}/messages")]
pub async fn get_messages(
    message_service: web::Data<MessageSvc>,
    conversation_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<MessageEntity>>, error::Error> {
    let messages = message_service.get_messages(*conversation_id).await?;

    Ok(success::Success::ok(Some(messages)).message("Successfully retrieved messages"))
}
