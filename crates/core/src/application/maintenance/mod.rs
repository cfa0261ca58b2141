// Maintenance Service
// Scheduled ticket retention and database housekeeping

use crate::error::Result;
use crate::port::{Maintenance, MaintenanceConfig, MaintenanceStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info};

/// Maintenance scheduler
///
/// Runs periodic maintenance operations (retention purge, VACUUM) in the background
pub struct MaintenanceScheduler {
    maintenance: Arc<dyn Maintenance>,
    config: MaintenanceConfig,
    interval_hours: u64,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    ///
    /// # Arguments
    /// * `maintenance` - Maintenance implementation
    /// * `config` - Maintenance configuration
    /// * `interval_hours` - How often to run maintenance (hours, at least 1)
    pub fn new(
        maintenance: Arc<dyn Maintenance>,
        config: MaintenanceConfig,
        interval_hours: u64,
    ) -> Self {
        Self {
            maintenance,
            config,
            interval_hours: interval_hours.max(1),
        }
    }

    /// Run maintenance loop until `shutdown` flips to true
    ///
    /// Should be spawned in tokio::spawn. The first tick fires immediately.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_hours = self.interval_hours,
            retention_days = self.config.finished_ticket_retention_days,
            "Maintenance scheduler started"
        );

        let mut tick = interval(Duration::from_secs(self.interval_hours * 3600));

        loop {
            tokio::select! {
                _ = tick.tick() => {}
                _ = shutdown.changed() => {
                    info!("Maintenance scheduler stopped");
                    return;
                }
            }

            info!("Running scheduled maintenance...");

            match self.maintenance.run_full_maintenance(&self.config).await {
                Ok(stats) => {
                    info!(
                        db_size_mb = stats.db_size_mb,
                        queue_count = stats.queue_count,
                        ticket_count = stats.ticket_count,
                        finished_tickets = stats.finished_ticket_count,
                        "Scheduled maintenance completed successfully"
                    );
                }
                Err(e) => {
                    error!(error = ?e, "Scheduled maintenance failed");
                }
            }
        }
    }

    /// Run maintenance immediately (for manual trigger)
    pub async fn run_now(&self) -> Result<MaintenanceStats> {
        info!("Running manual maintenance...");

        let stats = self.maintenance.run_full_maintenance(&self.config).await?;

        info!(
            db_size_mb = stats.db_size_mb,
            ticket_count = stats.ticket_count,
            "Manual maintenance completed"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingMaintenance {
        purges: AtomicUsize,
        vacuums: AtomicUsize,
        retention_seen: AtomicI64,
        db_size_mb: f64,
    }

    #[async_trait]
    impl Maintenance for CountingMaintenance {
        async fn vacuum(&self) -> Result<f64> {
            self.vacuums.fetch_add(1, Ordering::SeqCst);
            Ok(1.5)
        }

        async fn purge_finished_tickets(&self, retention_days: i64) -> Result<i64> {
            self.purges.fetch_add(1, Ordering::SeqCst);
            self.retention_seen.store(retention_days, Ordering::SeqCst);
            Ok(3)
        }

        async fn get_stats(&self) -> Result<MaintenanceStats> {
            Ok(MaintenanceStats {
                db_size_mb: self.db_size_mb,
                db_size_bytes: (self.db_size_mb * 1024.0 * 1024.0) as i64,
                queue_count: 1,
                ticket_count: 10,
                finished_ticket_count: 4,
                fragmentation_percent: 0.0,
            })
        }
    }

    #[tokio::test]
    async fn test_run_now_purges_with_configured_retention() {
        let maintenance = Arc::new(CountingMaintenance::default());
        let config = MaintenanceConfig {
            finished_ticket_retention_days: 7,
            ..Default::default()
        };
        let scheduler = MaintenanceScheduler::new(maintenance.clone(), config, 24);

        let stats = scheduler.run_now().await.unwrap();
        assert_eq!(stats.ticket_count, 10);
        assert_eq!(maintenance.purges.load(Ordering::SeqCst), 1);
        assert_eq!(maintenance.retention_seen.load(Ordering::SeqCst), 7);
        // Small database: no VACUUM
        assert_eq!(maintenance.vacuums.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_vacuum_only_above_size_limit() {
        let maintenance = Arc::new(CountingMaintenance {
            db_size_mb: 900.0,
            ..Default::default()
        });
        let scheduler =
            MaintenanceScheduler::new(maintenance.clone(), MaintenanceConfig::default(), 24);

        scheduler.run_now().await.unwrap();
        assert_eq!(maintenance.vacuums.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_loop_runs_first_tick_and_stops_on_shutdown() {
        let maintenance = Arc::new(CountingMaintenance::default());
        let scheduler =
            MaintenanceScheduler::new(maintenance.clone(), MaintenanceConfig::default(), 1);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(scheduler.run(rx));
        while maintenance.purges.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(maintenance.purges.load(Ordering::SeqCst), 1);
    }
}
