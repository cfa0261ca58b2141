// Ticket Counter Allocator
//
// Mints per-queue ticket numbers. The increment is a single atomic
// statement inside the caller's issuance transaction, so a number only
// becomes visible with the commit that persisted it, and a rolled back
// issuance leaves no gap.

use crate::domain::{format_ticket_number, DomainError};
use crate::error::{AppError, Result};
use crate::port::{IssuanceTransaction, SequenceOutcome, TransactionalTicketRepository};
use std::sync::Arc;
use tracing::debug;

/// A freshly minted ticket number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedNumber {
    pub sequence: i64,
    /// Formatted number, e.g. `A-12`
    pub number: String,
    pub prefix: String,
    /// Queue average at the time of issuance (estimator input)
    pub avg_service_minutes: u32,
}

/// Advance the queue's sequence inside an open issuance transaction
///
/// Must run before anything else in the transaction reads the queue.
pub async fn allocate(tx: &mut dyn IssuanceTransaction, queue_id: &str) -> Result<IssuedNumber> {
    match tx.increment_sequence(queue_id).await? {
        SequenceOutcome::Granted(grant) => {
            let number = format_ticket_number(&grant.ticket_prefix, grant.sequence);
            debug!(queue_id = %queue_id, sequence = grant.sequence, number = %number, "Sequence allocated");
            Ok(IssuedNumber {
                sequence: grant.sequence,
                number,
                prefix: grant.ticket_prefix,
                avg_service_minutes: grant.avg_service_minutes,
            })
        }
        SequenceOutcome::QueueMissing => Err(AppError::NotFound(format!("Queue {}", queue_id))),
        SequenceOutcome::QueueInactive => {
            Err(DomainError::QueueInactive(queue_id.to_string()).into())
        }
    }
}

/// Standalone allocator
///
/// `issue_number` commits the increment on its own; the number is consumed
/// even if no ticket is ever stored for it. Ticket issuance goes through
/// [`allocate`] inside its own transaction instead.
pub struct TicketAllocator {
    repo: Arc<dyn TransactionalTicketRepository>,
}

impl TicketAllocator {
    pub fn new(repo: Arc<dyn TransactionalTicketRepository>) -> Self {
        Self { repo }
    }

    pub async fn issue_number(&self, queue_id: &str) -> Result<IssuedNumber> {
        let mut tx = self.repo.begin_transaction().await?;
        match allocate(tx.as_mut(), queue_id).await {
            Ok(issued) => {
                tx.commit().await?;
                Ok(issued)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Queue, QueuePatch};
    use crate::error::ErrorKind;
    use crate::port::mocks::InMemoryStore;
    use crate::port::{QueueRepository, Transaction};
    use std::collections::HashSet;

    async fn store_with_queue(prefix: &str) -> (InMemoryStore, Queue) {
        let store = InMemoryStore::new();
        let queue = Queue::new("q-1", 0, "General", prefix, 5).unwrap();
        store.insert(&queue).await.unwrap();
        (store, queue)
    }

    #[tokio::test]
    async fn test_numbers_start_at_one_and_increase() {
        let (store, _) = store_with_queue("a").await;
        let allocator = TicketAllocator::new(Arc::new(store));

        let first = allocator.issue_number("q-1").await.unwrap();
        let second = allocator.issue_number("q-1").await.unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(first.number, "A-1");
        assert_eq!(second.number, "A-2");
        assert_eq!(second.avg_service_minutes, 5);
    }

    #[tokio::test]
    async fn test_unknown_queue_is_not_found() {
        let allocator = TicketAllocator::new(Arc::new(InMemoryStore::new()));
        let err = allocator.issue_number("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_inactive_queue_is_refused_without_consuming() {
        let (store, mut queue) = store_with_queue("B").await;
        queue
            .apply(
                QueuePatch {
                    is_active: Some(false),
                    ..Default::default()
                },
                10,
            )
            .unwrap();
        store.update(&queue).await.unwrap();

        let allocator = TicketAllocator::new(Arc::new(store.clone()));
        let err = allocator.issue_number("q-1").await.unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::QueueInactive(_))));

        let stored = QueueRepository::find_by_id(&store, &"q-1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.last_sequence, 0);
    }

    #[tokio::test]
    async fn test_rolled_back_allocation_leaves_no_gap() {
        let (store, _) = store_with_queue("C").await;

        let mut tx = store.begin_transaction().await.unwrap();
        let burned = allocate(tx.as_mut(), "q-1").await.unwrap();
        assert_eq!(burned.sequence, 1);
        tx.rollback().await.unwrap();

        let allocator = TicketAllocator::new(Arc::new(store));
        assert_eq!(allocator.issue_number("q-1").await.unwrap().sequence, 1);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_contiguous() {
        let (store, _) = store_with_queue("D").await;
        let allocator = Arc::new(TicketAllocator::new(Arc::new(store)));

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                tokio::spawn(async move { allocator.issue_number("q-1").await.unwrap().sequence })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            seen.insert(handle.await.unwrap());
        }
        let expected: HashSet<i64> = (1..=50).collect();
        assert_eq!(seen, expected);
    }
}
