//! Subscription wire protocol
//!
//! Client → server: `{"type":"subscribe_queue","queueId":"…"}`,
//! `{"type":"subscribe_token","tokenId":"…"}`.
//! Server → client acks: `subscribed_queue` / `subscribed_token` with the
//! same id field. Hub events are forwarded as the core serializes them.

use serde::{Deserialize, Serialize};
use smartq_core::application::Topic;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SubscribeQueue {
        #[serde(rename = "queueId")]
        queue_id: String,
    },
    SubscribeToken {
        #[serde(rename = "tokenId")]
        token_id: String,
    },
}

impl ClientMessage {
    pub fn topic(&self) -> Topic {
        match self {
            ClientMessage::SubscribeQueue { queue_id } => Topic::Queue(queue_id.clone()),
            ClientMessage::SubscribeToken { token_id } => Topic::Ticket(token_id.clone()),
        }
    }

    pub fn ack(&self) -> ServerMessage {
        match self {
            ClientMessage::SubscribeQueue { queue_id } => ServerMessage::SubscribedQueue {
                queue_id: queue_id.clone(),
            },
            ClientMessage::SubscribeToken { token_id } => ServerMessage::SubscribedToken {
                token_id: token_id.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    SubscribedQueue {
        #[serde(rename = "queueId")]
        queue_id: String,
    },
    SubscribedToken {
        #[serde(rename = "tokenId")]
        token_id: String,
    },
}

/// Parse a client frame. Malformed input is logged and yields `None`.
pub fn parse_client_message(text: &str) -> Option<ClientMessage> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::SubscribeQueue { queue_id }) if queue_id.trim().is_empty() => {
            warn!("Ignoring subscribe_queue without queueId");
            None
        }
        Ok(ClientMessage::SubscribeToken { token_id }) if token_id.trim().is_empty() => {
            warn!("Ignoring subscribe_token without tokenId");
            None
        }
        Ok(message) => Some(message),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed client message");
            None
        }
    }
}
