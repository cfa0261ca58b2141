// Application Layer - Use Cases and Business Logic

pub mod allocator;
pub mod constants;
pub mod estimator;
pub mod hub;
pub mod maintenance;
pub mod ordering;
pub mod queue_admin;
pub mod ticket;

// Re-exports
pub use allocator::{IssuedNumber, TicketAllocator};
pub use estimator::{DayFactor, EstimatorConfig, HourWindow, WaitEstimator};
pub use hub::{BroadcastHub, DeliveryReport, Topic};
pub use maintenance::MaintenanceScheduler;
pub use ordering::OrderingEngine;
pub use queue_admin::{CreateQueueRequest, QueueService, QueueSnapshot};
pub use ticket::{IssueTicketRequest, QueueStats, TicketService, TicketStatusView};

use crate::port::{QueueRepository, TicketRepository, TransactionalTicketRepository};
use std::sync::Arc;

/// Persistence ports shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub queues: Arc<dyn QueueRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub issuance: Arc<dyn TransactionalTicketRepository>,
}

impl Repositories {
    /// One store implementing every port (SQLite adapter, in-memory mock)
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: QueueRepository + TicketRepository + TransactionalTicketRepository + 'static,
    {
        Self {
            queues: store.clone(),
            tickets: store.clone(),
            issuance: store,
        }
    }
}
