// Hub Event - what subscribers receive on the push channel
//
// Wire shape: { "type": "token_called", "payload": { ...ticket } }

use super::queue::{Queue, QueueId};
use super::ticket::Ticket;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum HubEvent {
    TokenCreated(Ticket),
    TokenCalled(Ticket),
    TokenServed(Ticket),
    TokenCancelled(Ticket),
    /// Reserved no-show state (agent action)
    TokenNoShow(Ticket),
    QueueUpdated(Queue),
    QueueDeleted {
        #[serde(rename = "queueId")]
        queue_id: QueueId,
    },
}

impl HubEvent {
    /// Event type tag as sent on the wire
    pub fn type_name(&self) -> &'static str {
        match self {
            HubEvent::TokenCreated(_) => "token_created",
            HubEvent::TokenCalled(_) => "token_called",
            HubEvent::TokenServed(_) => "token_served",
            HubEvent::TokenCancelled(_) => "token_cancelled",
            HubEvent::TokenNoShow(_) => "token_no_show",
            HubEvent::QueueUpdated(_) => "queue_updated",
            HubEvent::QueueDeleted { .. } => "queue_deleted",
        }
    }

    /// Ticket carried by a `token_*` event
    pub fn ticket(&self) -> Option<&Ticket> {
        match self {
            HubEvent::TokenCreated(t)
            | HubEvent::TokenCalled(t)
            | HubEvent::TokenServed(t)
            | HubEvent::TokenCancelled(t)
            | HubEvent::TokenNoShow(t) => Some(t),
            _ => None,
        }
    }

    /// Queue the event belongs to
    pub fn queue_id(&self) -> &str {
        match self {
            HubEvent::QueueUpdated(q) => &q.id,
            HubEvent::QueueDeleted { queue_id } => queue_id,
            HubEvent::TokenCreated(t)
            | HubEvent::TokenCalled(t)
            | HubEvent::TokenServed(t)
            | HubEvent::TokenCancelled(t)
            | HubEvent::TokenNoShow(t) => &t.queue_id,
        }
    }
}
