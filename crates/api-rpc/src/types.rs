//! RPC Request/Response Types
//!
//! JSON-RPC method parameters and results. Entities (`Queue`, `Ticket`,
//! snapshots, stats) are returned in their core serialized form.

use serde::{Deserialize, Serialize};
use smartq_core::application::QueueStats;
use smartq_core::domain::{Priority, Queue, QueuePatch, Ticket};

/// queue.create.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueCreateRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ticket_prefix: String,
    pub avg_service_minutes: u32,
}

/// queue.list.v1
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueListRequest {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueListResponse {
    pub queues: Vec<Queue>,
}

/// queue.get.v1, queue.delete.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueIdRequest {
    pub queue_id: String,
}

/// queue.update.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueUpdateRequest {
    pub queue_id: String,
    #[serde(flatten)]
    pub patch: QueuePatch,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueDeleteResponse {
    pub queue_id: String,
    pub deleted: bool,
}

/// ticket.issue.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketIssueRequest {
    pub queue_id: String,
    #[serde(default)]
    pub priority: Priority,
}

/// ticket.status.v1, ticket.complete.v1, ticket.cancel.v1, ticket.no_show.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketIdRequest {
    pub ticket_id: String,
}

/// ticket.call_next.v1
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallNextRequest {
    pub queue_id: String,
    pub agent_id: String,
}

/// `ticket` is null when nobody is waiting
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallNextResponse {
    pub queue_id: String,
    pub ticket: Option<Ticket>,
}

/// admin.stats.v1 - all queues unless `queueId` is given
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest {
    #[serde(default)]
    pub queue_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub queues: Vec<QueueStats>,
    pub live_connections: usize,
    pub db_size_bytes: i64,
    pub uptime_seconds: u64,
}

/// admin.maintenance.v1 - Run manual maintenance
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    #[serde(default)]
    pub force_vacuum: bool,
    /// Overrides the configured retention for this run
    #[serde(default)]
    pub retention_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceResponse {
    pub vacuum_run: bool,
    pub tickets_deleted: i64,
    pub db_size_before: i64,
    pub db_size_after: i64,
}
