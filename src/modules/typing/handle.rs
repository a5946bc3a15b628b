use actix_web::{get, post, web, HttpRequest};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        conversation::repository_pg::ConversationPgRepository,
        typing::{
            repository_pg::TypingPgRepository, schema::TypingUser, service::TypingService,
        },
        user::{repository_pg::UserRepositoryPg, service::UserService},
    },
};

pub type TypingSvc =
    TypingService<TypingPgRepository, ConversationPgRepository, UserRepositoryPg>;

#[derive(Debug, Deserialize)]
pub struct TypingRequest {
    pub is_typing: bool,
}

#[post("/{conversation_id}/typing")]
pub async fn set_typing(
    typing_service: web::Data<TypingSvc>,
    user_service: web::Data<UserService>,
    conversation_id: web::Path<Uuid>,
    body: web::Json<TypingRequest>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    typing_service.set_typing(*conversation_id, user.id, body.is_typing).await?;

    Ok(success::Success::no_content())
}

#[get("/{conversation_id}/typing")]
pub async fn get_active_typers(
    typing_service: web::Data<TypingSvc>,
    conversation_id: web::Path<Uuid>,
) -> Result<success::Success<Vec<TypingUser>>, error::Error> {
    let typers = typing_service.active_typers(*conversation_id, chrono::Utc::now()).await?;

    Ok(success::Success::ok(Some(typers)).message("Successfully retrieved typing users"))
}

#[get("/")]
pub async fn get_all_active_typers(
    typing_service: web::Data<TypingSvc>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<HashMap<Uuid, Vec<TypingUser>>>, error::Error> {
    let claims = get_claims(&req)?;
    let user = user_service.require_by_external_id(&claims.sub).await?;

    let typers =
        typing_service.active_typers_for_user(user.id, chrono::Utc::now()).await?;

    Ok(success::Success::ok(Some(typers)).message("Successfully retrieved typing users"))
}
