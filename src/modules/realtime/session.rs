/// Per-connection session actor. Holds the auth state and pushes
/// outbound messages to the client through the mpsc channel bridged in
/// handler.rs. Async work (identity resolution) runs via `ctx.spawn` +
/// `into_actor`.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::modules::user::service::UserService;
use crate::utils::IdentityClaims;
use crate::ENV;

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::WebSocketServer;

pub struct WebSocketSession {
    pub id: Uuid,

    /// Set once the client authenticated; gates every other command.
    pub user_id: Option<Uuid>,

    pub server: Addr<WebSocketServer>,

    /// Outbound JSON towards the client (bridge -> handler.rs -> socket).
    pub tx: mpsc::UnboundedSender<String>,

    /// Resolves the identity token's external id to an internal user.
    pub user_service: UserService,
}

impl WebSocketSession {
    pub fn new(
        server: Addr<WebSocketServer>,
        tx: mpsc::UnboundedSender<String>,
        user_service: UserService,
    ) -> Self {
        Self { id: Uuid::now_v7(), user_id: None, server, tx, user_service }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!("Failed to queue message for session {}: {}", self.id, e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize ServerMessage (session {}): {}", self.id, e);
            }
        }
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    fn require_auth(&self) -> Option<Uuid> {
        if self.user_id.is_none() {
            self.send_error("Authenticate before issuing commands");
            tracing::warn!("Session {} not authenticated, command rejected", self.id);
        }
        self.user_id
    }

    fn handle_client_message(&mut self, msg: &ClientMessage, ctx: &mut Context<Self>) {
        match msg {
            ClientMessage::Auth { token } => {
                self.handle_auth(token.clone(), ctx);
            }

            ClientMessage::JoinConversation { conversation_id } => {
                let Some(user_id) = self.require_auth() else {
                    return;
                };
                self.server.do_send(JoinRoom { user_id, conversation_id: *conversation_id });
            }

            ClientMessage::LeaveConversation { conversation_id } => {
                let Some(user_id) = self.require_auth() else {
                    return;
                };
                self.server.do_send(LeaveRoom { user_id, conversation_id: *conversation_id });
            }

            ClientMessage::Ping => {
                self.send_to_client(&ServerMessage::Pong);
            }
        }
    }

    /// Verify the identity token, then resolve the external id to the
    /// internal user row before binding this session to it.
    fn handle_auth(&mut self, token: String, ctx: &mut Context<Self>) {
        if self.user_id.is_some() {
            self.send_error("Session already authenticated");
            return;
        }

        let claims =
            match IdentityClaims::decode(&token, ENV.identity_jwt_secret.as_ref()) {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::warn!("Token verification failed (session {}): {}", self.id, e);
                    self.send_to_client(&ServerMessage::AuthFailed {
                        reason: "Token invalid or expired".to_string(),
                    });
                    return;
                }
            };

        let user_service = self.user_service.clone();

        ctx.spawn(
            async move { user_service.require_by_external_id(&claims.sub).await }
                .into_actor(self)
                .map(|result, act, _ctx| match result {
                    Ok(user) => {
                        act.user_id = Some(user.id);
                        act.server
                            .do_send(Authenticate { session_id: act.id, user_id: user.id });
                        act.send_to_client(&ServerMessage::AuthSuccess { user_id: user.id });

                        tracing::info!(
                            "User {} authenticated on session {}",
                            user.id,
                            act.id
                        );
                    }
                    Err(_) => {
                        act.send_to_client(&ServerMessage::AuthFailed {
                            reason: "Profile not synced".to_string(),
                        });
                    }
                }),
        );
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("Session started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("Session stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl Message for ClientMessage {
    type Result = ();
}

/// Inbound protocol messages forwarded from handler.rs.
impl Handler<ClientMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        self.handle_client_message(&msg, ctx);
    }
}

/// Outbound messages from the server actor: serialize and ship.
impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}
