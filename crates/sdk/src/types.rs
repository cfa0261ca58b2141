//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types and entities served by the daemon.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Waiting,
    Serving,
    Served,
    Cancelled,
    NoShow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub ticket_prefix: String,
    pub avg_service_minutes: u32,
    pub is_active: bool,
    pub last_sequence: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub queue_id: String,
    pub sequence: i64,
    pub number: String,
    pub status: TicketStatus,
    pub priority: i32,
    pub estimated_wait_minutes: u32,
    pub created_at: i64,
    pub called_at: Option<i64>,
    pub served_at: Option<i64>,
    pub updated_at: i64,
    pub agent_id: Option<String>,
}

/// Ticket plus its place in line (0 unless waiting)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStatusView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub position: i64,
}

/// Queue detail with serving tickets first, then the waiting line
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub queue: Queue,
    pub tickets: Vec<Ticket>,
    pub waiting: usize,
    pub serving: usize,
}

/// Request to create a queue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueueRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ticket_prefix: String,
    pub avg_service_minutes: u32,
}

/// Fields to change on a queue; unset fields are left alone
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_service_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueListResponse {
    pub queues: Vec<Queue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueDeleteResponse {
    pub queue_id: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallNextResponse {
    pub queue_id: String,
    pub ticket: Option<Ticket>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub queue_id: String,
    pub queue_name: String,
    pub is_active: bool,
    pub waiting: i64,
    pub serving: i64,
    pub served: i64,
    pub cancelled: i64,
    pub no_show: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub queues: Vec<QueueStats>,
    pub live_connections: usize,
    pub db_size_bytes: i64,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub force_vacuum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceResponse {
    pub vacuum_run: bool,
    pub tickets_deleted: i64,
    pub db_size_before: i64,
    pub db_size_after: i64,
}
