//! Shared wiring: real SQLite adapter behind the application services

#![allow(dead_code)]

use smartq_core::application::{
    BroadcastHub, CreateQueueRequest, QueueService, TicketService, WaitEstimator,
};
use smartq_core::domain::Queue;
use smartq_core::port::mocks::FixedTimeProvider;
use smartq_core::port::{TimeProvider, UuidProvider};
use smartq_infra_sqlite::{create_pool, repositories, run_migrations};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

pub struct Harness {
    pub pool: SqlitePool,
    pub hub: Arc<BroadcastHub>,
    pub clock: Arc<FixedTimeProvider>,
    pub tickets: Arc<TicketService>,
    pub queues: Arc<QueueService>,
    db_file: Option<PathBuf>,
}

impl Harness {
    /// Single-connection in-memory database
    pub async fn in_memory() -> Self {
        Self::with_url("sqlite::memory:", None).await
    }

    /// Fresh database file, so the pool has real concurrent connections
    pub async fn on_disk() -> Self {
        let path = std::env::temp_dir().join(format!("smartq-it-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}", path.display());
        Self::with_url(&url, Some(path)).await
    }

    async fn with_url(url: &str, db_file: Option<PathBuf>) -> Self {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        // Tuesday 11:00 UTC: neutral time and day factors
        let clock = Arc::new(FixedTimeProvider::at_utc(2026, 10, 13, 11, 0));
        let time: Arc<dyn TimeProvider> = clock.clone();
        let hub = Arc::new(BroadcastHub::new());
        let repos = repositories(&pool);

        let tickets = Arc::new(TicketService::new(
            repos.clone(),
            WaitEstimator::default(),
            hub.clone(),
            Arc::new(UuidProvider),
            time.clone(),
        ));
        let queues = Arc::new(QueueService::new(
            repos,
            hub.clone(),
            Arc::new(UuidProvider),
            time,
        ));

        Self {
            pool,
            hub,
            clock,
            tickets,
            queues,
            db_file,
        }
    }

    pub async fn create_queue(&self, name: &str, prefix: &str, avg_minutes: u32) -> Queue {
        self.queues
            .create(CreateQueueRequest {
                name: name.to_string(),
                description: None,
                ticket_prefix: prefix.to_string(),
                avg_service_minutes: avg_minutes,
            })
            .await
            .unwrap()
    }

    pub async fn close(self) {
        self.pool.close().await;
        if let Some(path) = &self.db_file {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
            }
        }
    }
}
