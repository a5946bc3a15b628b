use actix_web::web::{scope, ServiceConfig};

use crate::modules::typing::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/conversations").service(set_typing).service(get_active_typers),
    );
    cfg.service(scope("/typing").service(get_all_active_typers));
}
