//! RPC Method Handlers
//!
//! Thin adapters from wire types onto the ticket and queue services.

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use crate::types::{
    CallNextRequest, CallNextResponse, MaintenanceRequest, MaintenanceResponse,
    QueueCreateRequest, QueueDeleteResponse, QueueIdRequest, QueueListRequest, QueueListResponse,
    QueueUpdateRequest, StatsRequest, StatsResponse, TicketIdRequest, TicketIssueRequest,
};
use jsonrpsee::types::ErrorObjectOwned;
use smartq_core::application::{
    BroadcastHub, CreateQueueRequest, IssueTicketRequest, QueueService, QueueSnapshot,
    TicketService, TicketStatusView,
};
use smartq_core::domain::{Queue, Ticket};
use smartq_core::port::{Maintenance, MaintenanceConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Fragmentation above which a manual maintenance run vacuums anyway
const VACUUM_FRAGMENTATION_PERCENT: f64 = 10.0;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// Everything the handlers call into
#[derive(Clone)]
pub struct RpcServices {
    pub tickets: Arc<TicketService>,
    pub queues: Arc<QueueService>,
    pub hub: Arc<BroadcastHub>,
    pub maintenance: Arc<dyn Maintenance>,
    pub maintenance_config: MaintenanceConfig,
}

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    services: RpcServices,
    rate_limiter: RateLimiter,
    start_time: Instant,
}

impl RpcHandler {
    pub fn new(services: RpcServices, rate_limit: RateLimitConfig) -> Self {
        Self {
            services,
            rate_limiter: RateLimiter::new(rate_limit),
            start_time: Instant::now(),
        }
    }

    /// Mutating methods spend a token; reads are free
    fn throttle(&self, method: &str) -> RpcResult<()> {
        if self.rate_limiter.try_acquire() {
            Ok(())
        } else {
            warn!(method = method, "Request throttled");
            Err(throttled())
        }
    }

    /// queue.create.v1
    pub async fn create_queue(&self, params: QueueCreateRequest) -> RpcResult<Queue> {
        self.throttle("queue.create.v1")?;

        let req = CreateQueueRequest {
            name: params.name,
            description: params.description,
            ticket_prefix: params.ticket_prefix,
            avg_service_minutes: params.avg_service_minutes,
        };
        self.services.queues.create(req).await.map_err(to_rpc_error)
    }

    /// queue.list.v1
    pub async fn list_queues(&self, params: QueueListRequest) -> RpcResult<QueueListResponse> {
        let queues = self
            .services
            .queues
            .list(params.include_inactive)
            .await
            .map_err(to_rpc_error)?;
        Ok(QueueListResponse { queues })
    }

    /// queue.get.v1
    pub async fn get_queue(&self, params: QueueIdRequest) -> RpcResult<QueueSnapshot> {
        self.services
            .queues
            .snapshot(&params.queue_id)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.update.v1
    pub async fn update_queue(&self, params: QueueUpdateRequest) -> RpcResult<Queue> {
        self.throttle("queue.update.v1")?;
        self.services
            .queues
            .update(&params.queue_id, params.patch)
            .await
            .map_err(to_rpc_error)
    }

    /// queue.delete.v1
    pub async fn delete_queue(&self, params: QueueIdRequest) -> RpcResult<QueueDeleteResponse> {
        self.throttle("queue.delete.v1")?;
        self.services
            .queues
            .delete(&params.queue_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(QueueDeleteResponse {
            queue_id: params.queue_id,
            deleted: true,
        })
    }

    /// ticket.issue.v1
    pub async fn issue_ticket(&self, params: TicketIssueRequest) -> RpcResult<Ticket> {
        self.throttle("ticket.issue.v1")?;

        let req = IssueTicketRequest::new(params.queue_id).with_priority(params.priority);
        self.services
            .tickets
            .issue_ticket(req)
            .await
            .map_err(to_rpc_error)
    }

    /// ticket.status.v1
    pub async fn ticket_status(&self, params: TicketIdRequest) -> RpcResult<TicketStatusView> {
        self.services
            .tickets
            .ticket_status(&params.ticket_id)
            .await
            .map_err(to_rpc_error)
    }

    /// ticket.call_next.v1
    pub async fn call_next(&self, params: CallNextRequest) -> RpcResult<CallNextResponse> {
        self.throttle("ticket.call_next.v1")?;

        let ticket = self
            .services
            .tickets
            .call_next(&params.queue_id, &params.agent_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(CallNextResponse {
            queue_id: params.queue_id,
            ticket,
        })
    }

    /// ticket.complete.v1
    pub async fn complete(&self, params: TicketIdRequest) -> RpcResult<Ticket> {
        self.throttle("ticket.complete.v1")?;
        self.services
            .tickets
            .complete(&params.ticket_id)
            .await
            .map_err(to_rpc_error)
    }

    /// ticket.cancel.v1
    pub async fn cancel(&self, params: TicketIdRequest) -> RpcResult<Ticket> {
        self.throttle("ticket.cancel.v1")?;
        self.services
            .tickets
            .cancel(&params.ticket_id)
            .await
            .map_err(to_rpc_error)
    }

    /// ticket.no_show.v1
    pub async fn no_show(&self, params: TicketIdRequest) -> RpcResult<Ticket> {
        self.throttle("ticket.no_show.v1")?;
        self.services
            .tickets
            .no_show(&params.ticket_id)
            .await
            .map_err(to_rpc_error)
    }

    /// admin.stats.v1
    pub async fn stats(&self, params: StatsRequest) -> RpcResult<StatsResponse> {
        let queues = self
            .services
            .tickets
            .stats(params.queue_id.as_deref())
            .await
            .map_err(to_rpc_error)?;

        let storage = self
            .services
            .maintenance
            .get_stats()
            .await
            .map_err(to_rpc_error)?;

        Ok(StatsResponse {
            queues,
            live_connections: self.services.hub.connection_count(),
            db_size_bytes: storage.db_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
        })
    }

    /// admin.maintenance.v1
    pub async fn maintenance(&self, params: MaintenanceRequest) -> RpcResult<MaintenanceResponse> {
        let maintenance = &self.services.maintenance;
        let stats_before = maintenance.get_stats().await.map_err(to_rpc_error)?;

        let retention_days = params
            .retention_days
            .unwrap_or(self.services.maintenance_config.finished_ticket_retention_days);
        let tickets_deleted = maintenance
            .purge_finished_tickets(retention_days)
            .await
            .map_err(to_rpc_error)?;

        let vacuum_run = params.force_vacuum
            || stats_before.fragmentation_percent > VACUUM_FRAGMENTATION_PERCENT;
        if vacuum_run {
            maintenance.vacuum().await.map_err(to_rpc_error)?;
        }

        let stats_after = maintenance.get_stats().await.map_err(to_rpc_error)?;

        info!(
            tickets_deleted = tickets_deleted,
            vacuum_run = vacuum_run,
            "Manual maintenance finished"
        );

        Ok(MaintenanceResponse {
            vacuum_run,
            tickets_deleted,
            db_size_before: stats_before.db_size_bytes,
            db_size_after: stats_after.db_size_bytes,
        })
    }
}
