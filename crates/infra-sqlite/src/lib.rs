// SmartQ Infrastructure - SQLite Adapter
// Implements: QueueRepository, TicketRepository, TransactionalTicketRepository, Maintenance

mod connection;
mod error;
mod maintenance_impl;
mod migration;
mod queue_repository;
mod ticket_repository;
mod transaction;

pub use connection::{create_pool, BUSY_TIMEOUT};
pub use maintenance_impl::SqliteMaintenance;
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use ticket_repository::SqliteTicketRepository;
pub use transaction::SqliteIssuanceTransaction;

use smartq_core::application::Repositories;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Wire every persistence port onto one pool
pub fn repositories(pool: &SqlitePool) -> Repositories {
    let tickets = Arc::new(SqliteTicketRepository::new(pool.clone()));
    Repositories {
        queues: Arc::new(SqliteQueueRepository::new(pool.clone())),
        tickets: tickets.clone(),
        issuance: tickets,
    }
}

// Note: sqlx::Error conversion is handled by `error::map_sqlx_error`
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
