// Issue Ticket Use Case

use crate::application::allocator::allocate;
use crate::application::estimator::WaitEstimator;
use crate::domain::{Priority, Ticket, MAX_PRIORITY, MIN_PRIORITY};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, IssuanceTransaction, TimeProvider, TransactionalTicketRepository};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Issue request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTicketRequest {
    pub queue_id: String,

    #[serde(default)]
    pub priority: Priority,
}

impl IssueTicketRequest {
    pub fn new(queue_id: impl Into<String>) -> Self {
        Self {
            queue_id: queue_id.into(),
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Execute issue use case (one transaction: number, estimate, insert)
///
/// # Arguments
///
/// * `repo` - Transactional ticket repository
/// * `estimator` - Wait-time estimator
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Clock (injected for determinism)
/// * `req` - Issue request
pub async fn execute(
    repo: &dyn TransactionalTicketRepository,
    estimator: &WaitEstimator,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: IssueTicketRequest,
) -> Result<Ticket> {
    if req.queue_id.trim().is_empty() {
        return Err(AppError::Validation("Queue ID is required".to_string()));
    }
    if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&req.priority) {
        return Err(AppError::Validation(format!(
            "Priority must be between {} and {}",
            MIN_PRIORITY, MAX_PRIORITY
        )));
    }

    let mut tx = repo.begin_transaction().await?;

    match issue_within(tx.as_mut(), estimator, id_provider, time_provider, &req).await {
        Ok(ticket) => {
            tx.commit().await?;
            info!(
                queue_id = %ticket.queue_id,
                ticket_id = %ticket.id,
                number = %ticket.number,
                priority = ticket.priority,
                estimated_wait_minutes = ticket.estimated_wait_minutes,
                "Ticket issued"
            );
            Ok(ticket)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

async fn issue_within(
    tx: &mut dyn IssuanceTransaction,
    estimator: &WaitEstimator,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: &IssueTicketRequest,
) -> Result<Ticket> {
    // Increment first: it write-locks the queue row for the rest of the transaction
    let issued = allocate(tx, &req.queue_id).await?;

    // Counted before the new ticket exists
    let waiting = tx.count_waiting(&req.queue_id).await?;
    let estimate = estimator.estimate(waiting, issued.avg_service_minutes, &time_provider.local_now());

    let ticket = Ticket::new(
        id_provider.generate_id(),
        time_provider.now_millis(),
        req.queue_id.clone(),
        issued.sequence,
        issued.number,
    )
    .with_priority(req.priority)
    .with_estimate(estimate);

    tx.insert_ticket(&ticket).await?;
    Ok(ticket)
}
