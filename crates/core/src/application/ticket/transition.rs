// Agent transitions after call-next: complete, cancel, no-show
//
// Load, apply the state machine, then compare-and-set on the status that was
// read. A lost CAS reloads and re-validates, so a ticket finished by someone
// else surfaces as the proper invalid-state error.

use crate::application::constants::TRANSITION_MAX_ATTEMPTS;
use crate::domain::{HubEvent, Ticket};
use crate::error::{AppError, Result};
use crate::port::{TicketRepository, TimeProvider};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Complete,
    Cancel,
    NoShow,
}

impl Transition {
    fn apply(self, ticket: &mut Ticket, now_millis: i64) -> Result<()> {
        match self {
            Transition::Complete => ticket.complete(now_millis)?,
            Transition::Cancel => ticket.cancel(now_millis)?,
            Transition::NoShow => ticket.mark_no_show(now_millis)?,
        }
        Ok(())
    }

    /// Event announcing the transitioned ticket
    pub fn event(self, ticket: Ticket) -> HubEvent {
        match self {
            Transition::Complete => HubEvent::TokenServed(ticket),
            Transition::Cancel => HubEvent::TokenCancelled(ticket),
            Transition::NoShow => HubEvent::TokenNoShow(ticket),
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Complete => write!(f, "complete"),
            Transition::Cancel => write!(f, "cancel"),
            Transition::NoShow => write!(f, "no_show"),
        }
    }
}

pub async fn execute(
    tickets: &dyn TicketRepository,
    time_provider: &dyn TimeProvider,
    ticket_id: &str,
    transition: Transition,
) -> Result<Ticket> {
    let ticket_id = ticket_id.to_string();

    for attempt in 1..=TRANSITION_MAX_ATTEMPTS {
        let current = tickets
            .find_by_id(&ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {}", ticket_id)))?;

        let expected = current.status;
        let mut next = current;
        transition.apply(&mut next, time_provider.now_millis())?;

        if tickets.compare_and_set(&next, expected).await? {
            info!(
                ticket_id = %next.id,
                queue_id = %next.queue_id,
                transition = %transition,
                from = %expected,
                to = %next.status,
                "Ticket transitioned"
            );
            return Ok(next);
        }

        debug!(ticket_id = %ticket_id, attempt, "Status changed underneath, reloading");
    }

    Err(AppError::Conflict(format!(
        "Ticket {} keeps changing, try again",
        ticket_id
    )))
}
