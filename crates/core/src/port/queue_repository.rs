// Queue Repository Port (Interface)

use crate::domain::{Queue, QueueId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Queue persistence
///
/// The ticket sequence is owned by the issuance transaction
/// (`IssuanceTransaction::increment_sequence`); nothing here writes it.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Insert a new queue (duplicate name or prefix -> `AppError::Conflict`)
    async fn insert(&self, queue: &Queue) -> Result<()>;

    /// Find queue by ID
    async fn find_by_id(&self, id: &QueueId) -> Result<Option<Queue>>;

    /// List queues ordered by name
    async fn list(&self, include_inactive: bool) -> Result<Vec<Queue>>;

    /// Persist editable fields. Returns false if the queue does not exist.
    async fn update(&self, queue: &Queue) -> Result<bool>;

    /// Delete queue and its ticket history. Returns false if it did not exist.
    async fn delete(&self, id: &QueueId) -> Result<bool>;
}
