//! WebSocket Gateway
//!
//! Turns WebSocket connections into broadcast hub subscribers. Clients send
//! `subscribe_queue` / `subscribe_token` requests and then receive every hub
//! event for the topics they joined.

pub mod connection;
pub mod gateway;
pub mod protocol;

pub use connection::WsSubscriber;
pub use gateway::{WsError, WsGateway, WsGatewayConfig};
pub use protocol::{ClientMessage, ServerMessage};
