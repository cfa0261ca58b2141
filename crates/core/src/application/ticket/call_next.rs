// Call Next Use Case
//
// Claim is one atomic select-and-update in the store. Storage contention
// surfaces as `Conflict`, which is retried here a bounded number of times.

use crate::application::constants::{
    CALL_NEXT_MAX_ATTEMPTS, CALL_NEXT_RETRY_BASE_DELAY, MAX_AGENT_ID_LEN,
};
use crate::domain::Ticket;
use crate::error::{AppError, Result};
use crate::port::{QueueRepository, TicketRepository, TimeProvider};
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

pub async fn execute(
    queues: &dyn QueueRepository,
    tickets: &dyn TicketRepository,
    time_provider: &dyn TimeProvider,
    queue_id: &str,
    agent_id: &str,
) -> Result<Option<Ticket>> {
    validate_agent(agent_id)?;

    if queues.find_by_id(&queue_id.to_string()).await?.is_none() {
        return Err(AppError::NotFound(format!("Queue {}", queue_id)));
    }

    let mut attempt = 1;
    loop {
        match tickets
            .claim_next(queue_id, agent_id, time_provider.now_millis())
            .await
        {
            Ok(Some(ticket)) => {
                info!(
                    queue_id = %queue_id,
                    ticket_id = %ticket.id,
                    number = %ticket.number,
                    agent_id = %agent_id,
                    "Ticket called"
                );
                return Ok(Some(ticket));
            }
            Ok(None) => return Ok(None),
            Err(e) if e.is_retryable() && attempt < CALL_NEXT_MAX_ATTEMPTS => {
                let delay = backoff(attempt);
                warn!(
                    queue_id = %queue_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Call-next lost a storage race, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) if e.is_retryable() => {
                return Err(AppError::Conflict(format!(
                    "Queue {} is busy, try again",
                    queue_id
                )));
            }
            Err(e) => return Err(e),
        }
    }
}

fn validate_agent(agent_id: &str) -> Result<()> {
    if agent_id.trim().is_empty() {
        return Err(AppError::Validation("Agent ID is required".to_string()));
    }
    if agent_id.len() > MAX_AGENT_ID_LEN {
        return Err(AppError::Validation(format!(
            "Agent ID too long (max {} bytes)",
            MAX_AGENT_ID_LEN
        )));
    }
    Ok(())
}

/// Linear backoff plus up to one base delay of jitter
fn backoff(attempt: u32) -> Duration {
    let base = CALL_NEXT_RETRY_BASE_DELAY.as_millis() as u64;
    let jitter = rand::thread_rng().gen_range(0..=base);
    Duration::from_millis(base * u64::from(attempt) + jitter)
}
