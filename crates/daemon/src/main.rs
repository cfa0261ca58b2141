//! SmartQ - Main Entry Point
//! JSON-RPC command surface + WebSocket push gateway over one SQLite store

mod config;
mod logging;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use config::DaemonConfig;
use smartq_api_rpc::{RpcHandler, RpcServer, RpcServices};
use smartq_api_ws::WsGateway;
use smartq_core::application::{
    BroadcastHub, MaintenanceScheduler, QueueService, TicketService, WaitEstimator,
};
use smartq_core::port::{SystemTimeProvider, UuidProvider};
use smartq_infra_sqlite::{create_pool, repositories, run_migrations, SqliteMaintenance};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration, then logging (the guard flushes the log file on exit)
    let config = DaemonConfig::load()?;
    let _log_guard = logging::init(&config.log)?;

    info!("SmartQ v{} starting...", VERSION);

    // 2. Database
    config.database.ensure_parent_dir()?;
    let db_url = config.database.url();
    info!(database = %db_url, "Initializing database...");

    let pool = create_pool(&db_url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 3. Dependency wiring
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let repos = repositories(&pool);
    let hub = Arc::new(BroadcastHub::new());

    let tickets = Arc::new(TicketService::new(
        repos.clone(),
        WaitEstimator::new(config.estimator.clone()),
        hub.clone(),
        id_provider.clone(),
        time_provider.clone(),
    ));
    let queues = Arc::new(QueueService::new(
        repos,
        hub.clone(),
        id_provider,
        time_provider.clone(),
    ));
    let maintenance = Arc::new(SqliteMaintenance::new(pool.clone(), time_provider));
    let maintenance_config = config.maintenance.to_config();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // 4. JSON-RPC server
    let handler = RpcHandler::new(
        RpcServices {
            tickets,
            queues,
            hub: hub.clone(),
            maintenance: maintenance.clone(),
            maintenance_config: maintenance_config.clone(),
        },
        config.rate_limit,
    );
    let (rpc_addr, rpc_handle) = RpcServer::new(config.rpc.clone(), handler)
        .start()
        .await
        .context("RPC server start failed")?;

    // 5. WebSocket gateway
    let gateway = WsGateway::bind(&config.ws, hub.clone())
        .await
        .context("WebSocket gateway start failed")?;
    let ws_addr = gateway.local_addr()?;
    let gateway_task = tokio::spawn(gateway.run(shutdown_rx.clone()));

    // 6. Housekeeping
    let scheduler = MaintenanceScheduler::new(
        maintenance,
        maintenance_config,
        config.maintenance.interval_hours,
    );
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    info!(rpc = %rpc_addr, ws = %ws_addr, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    wait_for_signal().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown: stop intake, then drop live subscriptions
    let _ = shutdown_tx.send(true);
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, gateway_task).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, scheduler_task).await;
    hub.shutdown();
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}

async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
