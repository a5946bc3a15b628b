use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::Arc;

use chatwave_backend::{
    ENV,
    configs::{RedisCache, connect_database},
    middlewares::authentication,
    modules::{
        conversation::{
            repository_pg::{ConversationPgRepository, UnreadPgRepository},
            route as conversation_route,
            service::ConversationService,
        },
        message::{repository_pg::MessageRepositoryPg, route as message_route, service::MessageService},
        realtime::{handler::websocket_handler, server::WebSocketServer},
        typing::{repository_pg::TypingPgRepository, route as typing_route, service::TypingService},
        user::{repository_pg::UserRepositoryPg, route as user_route, service::UserService},
    },
};

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let ws_server = Arc::new(WebSocketServer::new().start());

    let user_repo = UserRepositoryPg::new(db_pool.clone());
    let conversation_repo = Arc::new(ConversationPgRepository::new(db_pool.clone()));
    let unread_repo = Arc::new(UnreadPgRepository::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));
    let typing_repo = Arc::new(TypingPgRepository::new(db_pool.clone()));

    let user_service = UserService::with_dependencies(
        Arc::new(user_repo.clone()),
        Arc::new(redis_pool.clone()),
        ws_server.clone(),
    );
    let conversation_service = ConversationService::with_dependencies(
        conversation_repo.clone(),
        unread_repo.clone(),
        ws_server.clone(),
    );
    let message_service = MessageService::with_dependencies(
        message_repo.clone(),
        conversation_repo.clone(),
        ws_server.clone(),
    );
    let typing_service = TypingService::with_dependencies(
        typing_repo,
        conversation_repo,
        Arc::new(user_repo),
        ws_server.clone(),
    );

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(conversation_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new(typing_service.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(ws_server.as_ref().clone()))
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api")
                    .wrap(from_fn(authentication))
                    .configure(user_route::configure)
                    .configure(conversation_route::configure)
                    .configure(message_route::configure)
                    .configure(typing_route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
