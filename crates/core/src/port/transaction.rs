// Transaction port for atomic ticket issuance

use crate::domain::Ticket;
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Sequence value handed out by an atomic increment-and-fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceGrant {
    pub sequence: i64,
    pub ticket_prefix: String,
    pub avg_service_minutes: u32,
}

/// Result of trying to advance a queue's sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceOutcome {
    Granted(SequenceGrant),
    QueueMissing,
    QueueInactive,
}

/// Ticket store that can open an issuance transaction
#[async_trait]
pub trait TransactionalTicketRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn IssuanceTransaction>>;
}

/// Ticket issuance steps (within one transaction)
///
/// `increment_sequence` must be the first statement so the queue row is
/// write-locked before anything is read.
#[async_trait]
pub trait IssuanceTransaction: Transaction {
    /// Atomically advance `last_sequence` of an active queue and return it
    async fn increment_sequence(&mut self, queue_id: &str) -> Result<SequenceOutcome>;

    /// Count waiting tickets (within transaction)
    async fn count_waiting(&mut self, queue_id: &str) -> Result<i64>;

    /// Insert ticket (within transaction)
    async fn insert_ticket(&mut self, ticket: &Ticket) -> Result<()>;
}
