// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod maintenance;
pub mod queue_repository;
pub mod subscriber; // Real-time transport capability
pub mod ticket_repository;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use id_provider::{IdProvider, UuidProvider};
pub use maintenance::{Maintenance, MaintenanceConfig, MaintenanceStats};
pub use queue_repository::QueueRepository;
pub use subscriber::{ConnectionId, DeliveryError, Subscriber};
pub use ticket_repository::{StatusCounts, TicketRepository};
pub use time_provider::{SystemTimeProvider, TimeProvider};
pub use transaction::{
    IssuanceTransaction, SequenceGrant, SequenceOutcome, Transaction,
    TransactionalTicketRepository,
};

/// Test doubles for every port
pub mod mocks {
    pub use super::id_provider::mocks::SequentialIdProvider;
    pub use super::subscriber::mocks::RecordingSubscriber;
    pub use super::ticket_repository::mocks::InMemoryStore;
    pub use super::time_provider::mocks::FixedTimeProvider;
}
