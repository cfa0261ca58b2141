// Ticket status lookup and raw queue statistics

use crate::application::ordering::OrderingEngine;
use crate::domain::{QueueId, Ticket};
use crate::error::{AppError, Result};
use crate::port::{QueueRepository, StatusCounts, TicketRepository};
use serde::{Deserialize, Serialize};

/// Ticket plus its current place in line (0 unless waiting)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStatusView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub position: i64,
}

pub async fn ticket_status(
    tickets: &dyn TicketRepository,
    ordering: &OrderingEngine,
    ticket_id: &str,
) -> Result<TicketStatusView> {
    let ticket = tickets
        .find_by_id(&ticket_id.to_string())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {}", ticket_id)))?;

    let position = ordering.position_of(&ticket).await?;
    Ok(TicketStatusView { ticket, position })
}

/// Raw per-status counts of one queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub queue_id: QueueId,
    pub queue_name: String,
    pub is_active: bool,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

/// Stats for one queue, or every queue (inactive included) when `None`
pub async fn stats(
    queues: &dyn QueueRepository,
    tickets: &dyn TicketRepository,
    queue_id: Option<&str>,
) -> Result<Vec<QueueStats>> {
    let targets = match queue_id {
        Some(id) => {
            let queue = queues
                .find_by_id(&id.to_string())
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Queue {}", id)))?;
            vec![queue]
        }
        None => queues.list(true).await?,
    };

    let mut out = Vec::with_capacity(targets.len());
    for queue in targets {
        let counts = tickets.status_counts(&queue.id).await?;
        out.push(QueueStats {
            queue_id: queue.id,
            queue_name: queue.name,
            is_active: queue.is_active,
            counts,
        });
    }
    Ok(out)
}
