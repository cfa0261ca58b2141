//! Subscription & Broadcast Hub
//!
//! Keeps track of which live connections are interested in which queue or
//! ticket, and fans hub events out to them.
//!
//! Delivery is at-most-once: each event is serialized once, offered to every
//! current subscriber through its non-blocking [`Subscriber::send`], and
//! never retried or replayed. A full outbox drops the event for that
//! subscriber only. A closed connection is forgotten on the spot.
//!
//! Registries are sharded concurrent maps. No lock is held across a send.

mod registry;

use crate::domain::{HubEvent, QueueId, TicketId};
use crate::port::{ConnectionId, DeliveryError, Subscriber};
use dashmap::DashMap;
use registry::TopicIndex;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a connection can subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    Queue(QueueId),
    Ticket(TicketId),
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topic::Queue(id) => write!(f, "queue:{}", id),
            Topic::Ticket(id) => write!(f, "ticket:{}", id),
        }
    }
}

/// Outcome of one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Default)]
pub struct BroadcastHub {
    connections: DashMap<ConnectionId, Arc<dyn Subscriber>>,
    queues: TopicIndex,
    tickets: TopicIndex,
    /// Reverse index so a disconnect only visits the connection's own topics
    topics_by_connection: DashMap<ConnectionId, HashSet<Topic>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn index<'a>(&'a self, topic: &'a Topic) -> (&'a TopicIndex, &'a str) {
        match topic {
            Topic::Queue(id) => (&self.queues, id.as_str()),
            Topic::Ticket(id) => (&self.tickets, id.as_str()),
        }
    }

    /// Register `subscriber` for `topic`
    ///
    /// Idempotent. Returns true when the subscription is new.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>, topic: Topic) -> bool {
        let connection_id = subscriber.connection_id();
        self.connections
            .entry(connection_id)
            .or_insert_with(|| subscriber);

        let (index, key) = self.index(&topic);
        let added = index.add(key, connection_id);

        self.topics_by_connection
            .entry(connection_id)
            .or_default()
            .insert(topic.clone());

        debug!(connection_id, topic = %topic, added, "Subscribed");
        added
    }

    /// Forget a connection and all of its subscriptions. Idempotent.
    ///
    /// Returns the number of subscriptions removed.
    pub fn on_disconnect(&self, connection_id: ConnectionId) -> usize {
        self.connections.remove(&connection_id);

        let Some((_, topics)) = self.topics_by_connection.remove(&connection_id) else {
            return 0;
        };

        let mut removed = 0;
        for topic in &topics {
            let (index, key) = self.index(topic);
            if index.remove(key, connection_id) {
                removed += 1;
            }
        }
        debug!(connection_id, removed, "Connection unregistered");
        removed
    }

    /// Deliver `event` to every subscriber of `topic`
    pub fn publish(&self, topic: &Topic, event: &HubEvent) -> DeliveryReport {
        self.publish_to(std::slice::from_ref(topic), event)
    }

    /// Deliver `event` once to every connection subscribed to any of `topics`
    pub fn publish_to(&self, topics: &[Topic], event: &HubEvent) -> DeliveryReport {
        let frame: Arc<str> = match serde_json::to_string(event) {
            Ok(json) => json.into(),
            Err(e) => {
                warn!(error = %e, event = event.type_name(), "Failed to serialize hub event");
                return DeliveryReport::default();
            }
        };

        let recipients: BTreeSet<ConnectionId> = topics
            .iter()
            .flat_map(|topic| {
                let (index, key) = self.index(topic);
                index.members(key)
            })
            .collect();

        let mut report = DeliveryReport::default();
        for connection_id in recipients {
            let subscriber = match self.connections.get(&connection_id) {
                Some(entry) => Arc::clone(entry.value()),
                None => continue,
            };

            match subscriber.send(Arc::clone(&frame)) {
                Ok(()) => report.delivered += 1,
                Err(DeliveryError::Backpressure) => {
                    report.dropped += 1;
                    debug!(connection_id, event = event.type_name(), "Outbox full, event dropped");
                }
                Err(DeliveryError::Closed) => {
                    report.dropped += 1;
                    debug!(connection_id, "Subscriber closed, pruning");
                    self.on_disconnect(connection_id);
                }
            }
        }
        report
    }

    /// Route an event to the topics it belongs to
    ///
    /// Ticket events go to the owning queue and to the ticket itself;
    /// queue events go to the queue.
    pub fn broadcast(&self, event: &HubEvent) -> DeliveryReport {
        let mut topics = vec![Topic::Queue(event.queue_id().to_string())];
        if let Some(ticket) = event.ticket() {
            topics.push(Topic::Ticket(ticket.id.clone()));
        }

        let report = self.publish_to(&topics, event);
        debug!(
            event = event.type_name(),
            queue_id = %event.queue_id(),
            delivered = report.delivered,
            dropped = report.dropped,
            "Hub event published"
        );
        report
    }

    /// Drop every registration (service stop)
    pub fn shutdown(&self) {
        let connections = self.connections.len();
        self.connections.clear();
        self.topics_by_connection.clear();
        self.queues.clear();
        self.tickets.clear();
        debug!(connections, "Broadcast hub cleared");
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        let (index, key) = self.index(topic);
        index.count(key)
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.queues.key_count() + self.tickets.key_count()
    }
}
