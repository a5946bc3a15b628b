use actix_web::{get, post, put, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::user::{
        model::{PresenceRequest, SyncProfileRequest, SyncProfileResponse, SyncProfile, UserResponse},
        service::UserService,
    },
    utils::ValidatedJson,
};

#[post("/sync")]
pub async fn sync_profile(
    user_service: web::Data<UserService>,
    body: ValidatedJson<SyncProfileRequest>,
    req: HttpRequest,
) -> Result<success::Success<SyncProfileResponse>, error::Error> {
    let claims = get_claims(&req)?;
    let body = body.0;

    let user_id = user_service
        .sync_profile(SyncProfile {
            external_id: claims.sub,
            display_name: body.name,
            avatar_url: body.avatar_url,
            email: body.email,
        })
        .await?;

    Ok(success::Success::ok(Some(SyncProfileResponse { id: user_id }))
        .message("Profile synced successfully"))
}

#[put("/presence")]
pub async fn set_presence(
    user_service: web::Data<UserService>,
    body: web::Json<PresenceRequest>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let claims = get_claims(&req)?;

    user_service.set_online(&claims.sub, body.online).await?;

    Ok(success::Success::no_content())
}

#[get("/")]
pub async fn get_users(
    user_service: web::Data<UserService>,
) -> Result<success::Success<Vec<UserResponse>>, error::Error> {
    let users = user_service.get_users().await?;

    Ok(success::Success::ok(Some(users)).message("Successfully retrieved users"))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<UserResponse>, error::Error> {
    let user = user_service.get_by_id(user_id.into_inner()).await?;

    Ok(success::Success::ok(Some(user)).message("User retrieved successfully"))
}
