use actix_web::web::{scope, ServiceConfig};

use crate::modules::conversation::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/conversations")
            .service(get_conversations)
            .service(create_conversation)
            .service(get_conversation)
            .service(acknowledge_read)
            .service(get_unread_count)
            .service(get_messages),
    );
}
