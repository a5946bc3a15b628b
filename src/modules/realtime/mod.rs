/// Realtime delivery layer.
///
/// Clients subscribe over WebSocket and receive change notifications
/// for the entities they watch. The store never depends on delivery:
/// services fire events after commit and a lost event costs a client
/// one refetch, nothing more.
pub mod events;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;
