// Ticket Repository Port (Interface)

use crate::domain::{Ticket, TicketId, TicketStatus};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw per-status ticket counts for one queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub waiting: i64,
    pub serving: i64,
    pub served: i64,
    pub cancelled: i64,
    pub no_show: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: TicketStatus, n: i64) {
        match status {
            TicketStatus::Waiting => self.waiting += n,
            TicketStatus::Serving => self.serving += n,
            TicketStatus::Served => self.served += n,
            TicketStatus::Cancelled => self.cancelled += n,
            TicketStatus::NoShow => self.no_show += n,
        }
    }

    /// Waiting + serving
    pub fn active(&self) -> i64 {
        self.waiting + self.serving
    }

    pub fn total(&self) -> i64 {
        self.waiting + self.serving + self.served + self.cancelled + self.no_show
    }
}

/// Repository interface for Ticket persistence
///
/// Every ordered query uses the canonical service order
/// (`domain::ordering`): priority DESC, created_at ASC, sequence ASC.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Find ticket by ID
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// Count waiting tickets served strictly before `ticket`
    async fn count_ahead(&self, ticket: &Ticket) -> Result<i64>;

    /// Next waiting ticket without claiming it
    async fn peek_next(&self, queue_id: &str) -> Result<Option<Ticket>>;

    /// Tickets in any of `statuses`, in service order
    async fn list_by_status(&self, queue_id: &str, statuses: &[TicketStatus]) -> Result<Vec<Ticket>>;

    /// Atomically select the next waiting ticket and move it to SERVING
    ///
    /// Two concurrent callers never receive the same ticket. `None` when
    /// nothing is waiting.
    async fn claim_next(&self, queue_id: &str, agent_id: &str, now_millis: i64) -> Result<Option<Ticket>>;

    /// Persist `ticket`'s status, timestamps and agent only if the stored
    /// status still equals `expected`. Returns false when the CAS lost.
    async fn compare_and_set(&self, ticket: &Ticket, expected: TicketStatus) -> Result<bool>;

    /// Raw counts per status for one queue
    async fn status_counts(&self, queue_id: &str) -> Result<StatusCounts>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::ordering::{is_ahead_of, select_next, sort_canonical};
    use crate::domain::{Queue, QueueId};
    use crate::error::AppError;
    use crate::port::transaction::{
        IssuanceTransaction, SequenceGrant, SequenceOutcome, Transaction,
        TransactionalTicketRepository,
    };
    use crate::port::QueueRepository;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{Mutex, OwnedMutexGuard};

    #[derive(Default)]
    struct State {
        queues: HashMap<QueueId, Queue>,
        tickets: HashMap<TicketId, Ticket>,
    }

    /// In-memory store implementing every persistence port
    ///
    /// A single async mutex serializes writers, which gives the same
    /// atomicity the SQL adapter gets from conditional updates.
    #[derive(Clone, Default)]
    pub struct InMemoryStore {
        state: Arc<Mutex<State>>,
        claim_conflicts: Arc<AtomicUsize>,
    }

    impl InMemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next `n` `claim_next` calls fail with `AppError::Conflict`
        pub fn inject_claim_conflicts(&self, n: usize) {
            self.claim_conflicts.store(n, Ordering::SeqCst);
        }

        /// Overwrite a stored ticket (test setup)
        pub async fn put_ticket(&self, ticket: Ticket) {
            self.state
                .lock()
                .await
                .tickets
                .insert(ticket.id.clone(), ticket);
        }

        pub async fn ticket_count(&self) -> usize {
            self.state.lock().await.tickets.len()
        }
    }

    #[async_trait]
    impl QueueRepository for InMemoryStore {
        async fn insert(&self, queue: &Queue) -> Result<()> {
            let mut state = self.state.lock().await;
            let duplicate = state.queues.values().any(|q| {
                q.id == queue.id || q.name == queue.name || q.ticket_prefix == queue.ticket_prefix
            });
            if duplicate {
                return Err(AppError::Conflict(format!(
                    "Queue name or prefix already in use: {}",
                    queue.name
                )));
            }
            state.queues.insert(queue.id.clone(), queue.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &QueueId) -> Result<Option<Queue>> {
            Ok(self.state.lock().await.queues.get(id).cloned())
        }

        async fn list(&self, include_inactive: bool) -> Result<Vec<Queue>> {
            let state = self.state.lock().await;
            let mut queues: Vec<Queue> = state
                .queues
                .values()
                .filter(|q| include_inactive || q.is_active)
                .cloned()
                .collect();
            queues.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(queues)
        }

        async fn update(&self, queue: &Queue) -> Result<bool> {
            let mut state = self.state.lock().await;
            let Some(stored) = state.queues.get_mut(&queue.id) else {
                return Ok(false);
            };
            let last_sequence = stored.last_sequence;
            *stored = queue.clone();
            stored.last_sequence = last_sequence;
            Ok(true)
        }

        async fn delete(&self, id: &QueueId) -> Result<bool> {
            let mut state = self.state.lock().await;
            let existed = state.queues.remove(id).is_some();
            state.tickets.retain(|_, t| &t.queue_id != id);
            Ok(existed)
        }
    }

    #[async_trait]
    impl TicketRepository for InMemoryStore {
        async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>> {
            Ok(self.state.lock().await.tickets.get(id).cloned())
        }

        async fn count_ahead(&self, ticket: &Ticket) -> Result<i64> {
            let state = self.state.lock().await;
            Ok(state
                .tickets
                .values()
                .filter(|t| {
                    t.queue_id == ticket.queue_id
                        && t.status == TicketStatus::Waiting
                        && is_ahead_of(t, ticket)
                })
                .count() as i64)
        }

        async fn peek_next(&self, queue_id: &str) -> Result<Option<Ticket>> {
            let state = self.state.lock().await;
            Ok(select_next(state.tickets.values(), queue_id).cloned())
        }

        async fn list_by_status(
            &self,
            queue_id: &str,
            statuses: &[TicketStatus],
        ) -> Result<Vec<Ticket>> {
            let state = self.state.lock().await;
            let mut tickets: Vec<Ticket> = state
                .tickets
                .values()
                .filter(|t| t.queue_id == queue_id && statuses.contains(&t.status))
                .cloned()
                .collect();
            sort_canonical(&mut tickets);
            Ok(tickets)
        }

        async fn claim_next(
            &self,
            queue_id: &str,
            agent_id: &str,
            now_millis: i64,
        ) -> Result<Option<Ticket>> {
            let injected = self
                .claim_conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            if injected.is_ok() {
                return Err(AppError::Conflict("injected claim conflict".to_string()));
            }

            let mut state = self.state.lock().await;
            let Some(next_id) = select_next(state.tickets.values(), queue_id).map(|t| t.id.clone())
            else {
                return Ok(None);
            };
            let Some(ticket) = state.tickets.get_mut(&next_id) else {
                return Ok(None);
            };
            ticket.call(agent_id, now_millis)?;
            Ok(Some(ticket.clone()))
        }

        async fn compare_and_set(&self, ticket: &Ticket, expected: TicketStatus) -> Result<bool> {
            let mut state = self.state.lock().await;
            match state.tickets.get_mut(&ticket.id) {
                Some(stored) if stored.status == expected => {
                    stored.status = ticket.status;
                    stored.called_at = ticket.called_at;
                    stored.served_at = ticket.served_at;
                    stored.updated_at = ticket.updated_at;
                    stored.agent_id = ticket.agent_id.clone();
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn status_counts(&self, queue_id: &str) -> Result<StatusCounts> {
            let state = self.state.lock().await;
            let mut counts = StatusCounts::default();
            for ticket in state.tickets.values().filter(|t| t.queue_id == queue_id) {
                counts.add(ticket.status, 1);
            }
            Ok(counts)
        }
    }

    #[async_trait]
    impl TransactionalTicketRepository for InMemoryStore {
        async fn begin_transaction(&self) -> Result<Box<dyn IssuanceTransaction>> {
            let guard = Arc::clone(&self.state).lock_owned().await;
            Ok(Box::new(InMemoryTransaction {
                guard,
                staged_sequences: HashMap::new(),
                staged_tickets: Vec::new(),
            }))
        }
    }

    /// Holds the store lock for its whole lifetime; writes apply on commit
    struct InMemoryTransaction {
        guard: OwnedMutexGuard<State>,
        staged_sequences: HashMap<QueueId, i64>,
        staged_tickets: Vec<Ticket>,
    }

    #[async_trait]
    impl Transaction for InMemoryTransaction {
        async fn commit(mut self: Box<Self>) -> Result<()> {
            let staged_sequences = std::mem::take(&mut self.staged_sequences);
            for (queue_id, sequence) in staged_sequences {
                if let Some(queue) = self.guard.queues.get_mut(&queue_id) {
                    queue.last_sequence = sequence;
                }
            }
            let staged_tickets = std::mem::take(&mut self.staged_tickets);
            for ticket in staged_tickets {
                self.guard.tickets.insert(ticket.id.clone(), ticket);
            }
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl IssuanceTransaction for InMemoryTransaction {
        async fn increment_sequence(&mut self, queue_id: &str) -> Result<SequenceOutcome> {
            let Some(queue) = self.guard.queues.get(queue_id) else {
                return Ok(SequenceOutcome::QueueMissing);
            };
            if !queue.is_active {
                return Ok(SequenceOutcome::QueueInactive);
            }
            let current = self
                .staged_sequences
                .get(queue_id)
                .copied()
                .unwrap_or(queue.last_sequence);
            let grant = SequenceGrant {
                sequence: current + 1,
                ticket_prefix: queue.ticket_prefix.clone(),
                avg_service_minutes: queue.avg_service_minutes,
            };
            self.staged_sequences
                .insert(queue_id.to_string(), grant.sequence);
            Ok(SequenceOutcome::Granted(grant))
        }

        async fn count_waiting(&mut self, queue_id: &str) -> Result<i64> {
            let stored = self
                .guard
                .tickets
                .values()
                .filter(|t| t.queue_id == queue_id && t.status == TicketStatus::Waiting)
                .count();
            let staged = self
                .staged_tickets
                .iter()
                .filter(|t| t.queue_id == queue_id && t.status == TicketStatus::Waiting)
                .count();
            Ok((stored + staged) as i64)
        }

        async fn insert_ticket(&mut self, ticket: &Ticket) -> Result<()> {
            if self.guard.tickets.contains_key(&ticket.id) {
                return Err(AppError::Conflict(format!(
                    "Ticket {} already exists",
                    ticket.id
                )));
            }
            self.staged_tickets.push(ticket.clone());
            Ok(())
        }
    }
}
