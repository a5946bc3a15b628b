use actix_web::web::{scope, ServiceConfig};

use crate::modules::user::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/users")
            .service(sync_profile)
            .service(set_presence)
            .service(get_users)
            .service(get_user),
    );
}
