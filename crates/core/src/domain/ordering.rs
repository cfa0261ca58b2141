//! Canonical service order
//!
//! `(priority DESC, created_at ASC, sequence ASC)` is the only ordering rule
//! for waiting tickets. SQL adapters must mirror it exactly in their
//! `ORDER BY` clauses and "ahead of" predicates.

use super::ticket::{Ticket, TicketStatus};
use std::cmp::Ordering;

/// Compare two tickets by service order (`Less` = served first)
pub fn service_order(a: &Ticket, b: &Ticket) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// True if `other` is served strictly before `ticket`
pub fn is_ahead_of(other: &Ticket, ticket: &Ticket) -> bool {
    service_order(other, ticket) == Ordering::Less
}

/// Pick the next waiting ticket of a queue, if any
pub fn select_next<'a, I>(tickets: I, queue_id: &str) -> Option<&'a Ticket>
where
    I: IntoIterator<Item = &'a Ticket>,
{
    tickets
        .into_iter()
        .filter(|t| t.queue_id == queue_id && t.status == TicketStatus::Waiting)
        .min_by(|a, b| service_order(a, b))
}

/// 1-based position of `ticket` among the waiting tickets of its queue
///
/// Returns 0 when the ticket is not waiting.
pub fn position_in<'a, I>(tickets: I, ticket: &Ticket) -> i64
where
    I: IntoIterator<Item = &'a Ticket>,
{
    if ticket.status != TicketStatus::Waiting {
        return 0;
    }
    let ahead = tickets
        .into_iter()
        .filter(|t| {
            t.queue_id == ticket.queue_id
                && t.status == TicketStatus::Waiting
                && t.id != ticket.id
                && is_ahead_of(t, ticket)
        })
        .count();
    ahead as i64 + 1
}

/// Sort in place by service order
pub fn sort_canonical(tickets: &mut [Ticket]) {
    tickets.sort_by(service_order);
}
