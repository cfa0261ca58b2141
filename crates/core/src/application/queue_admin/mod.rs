// Queue administration: create, inspect, edit and remove waiting lines

use crate::application::hub::BroadcastHub;
use crate::application::ordering::OrderingEngine;
use crate::application::Repositories;
use crate::domain::{HubEvent, Queue, QueueId, QueuePatch, Ticket, TicketStatus};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueueRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ticket_prefix: String,
    pub avg_service_minutes: u32,
}

/// Queue detail with its live line (serving first, then waiting, in service order)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub queue: Queue,
    pub tickets: Vec<Ticket>,
    pub waiting: usize,
    pub serving: usize,
}

pub struct QueueService {
    repos: Repositories,
    ordering: OrderingEngine,
    hub: Arc<BroadcastHub>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl QueueService {
    pub fn new(
        repos: Repositories,
        hub: Arc<BroadcastHub>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            ordering: OrderingEngine::new(repos.tickets.clone()),
            repos,
            hub,
            id_provider,
            time_provider,
        }
    }

    pub async fn create(&self, req: CreateQueueRequest) -> Result<Queue> {
        let queue = Queue::new(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
            req.name,
            req.ticket_prefix,
            req.avg_service_minutes,
        )?
        .with_description(req.description);

        self.repos.queues.insert(&queue).await?;

        info!(
            queue_id = %queue.id,
            name = %queue.name,
            prefix = %queue.ticket_prefix,
            "Queue created"
        );
        Ok(queue)
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Queue>> {
        self.repos.queues.list(include_inactive).await
    }

    pub async fn get(&self, queue_id: &str) -> Result<Queue> {
        self.repos
            .queues
            .find_by_id(&queue_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue {}", queue_id)))
    }

    pub async fn snapshot(&self, queue_id: &str) -> Result<QueueSnapshot> {
        let queue = self.get(queue_id).await?;
        let mut tickets = self.ordering.waiting_line(queue_id).await?;
        // Serving tickets are listed ahead of the line
        tickets.sort_by_key(|t| t.status != TicketStatus::Serving);

        let serving = tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Serving)
            .count();
        Ok(QueueSnapshot {
            waiting: tickets.len() - serving,
            serving,
            queue,
            tickets,
        })
    }

    /// Edit a queue and announce `queue_updated`. The sequence is never touched.
    pub async fn update(&self, queue_id: &str, patch: QueuePatch) -> Result<Queue> {
        if patch.is_empty() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }

        let mut queue = self.get(queue_id).await?;
        queue.apply(patch, self.time_provider.now_millis())?;

        if !self.repos.queues.update(&queue).await? {
            return Err(AppError::NotFound(format!("Queue {}", queue_id)));
        }

        info!(queue_id = %queue.id, is_active = queue.is_active, "Queue updated");
        self.hub.broadcast(&HubEvent::QueueUpdated(queue.clone()));
        Ok(queue)
    }

    /// Delete a queue with its ticket history and announce `queue_deleted`
    ///
    /// Refused while anyone is waiting or being served.
    pub async fn delete(&self, queue_id: &str) -> Result<()> {
        let queue = self.get(queue_id).await?;

        let counts = self.repos.tickets.status_counts(&queue.id).await?;
        if counts.active() > 0 {
            return Err(AppError::Conflict(format!(
                "Queue {} still has {} active tickets",
                queue.name,
                counts.active()
            )));
        }

        let queue_id: QueueId = queue.id;
        if !self.repos.queues.delete(&queue_id).await? {
            return Err(AppError::NotFound(format!("Queue {}", queue_id)));
        }

        info!(queue_id = %queue_id, purged_tickets = counts.total(), "Queue deleted");
        self.hub.broadcast(&HubEvent::QueueDeleted { queue_id });
        Ok(())
    }
}
