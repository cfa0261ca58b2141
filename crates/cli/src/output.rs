//! Table rows for daemon results

use serde::Deserialize;
use tabled::Tabled;

fn display_option<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

#[derive(Debug, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct QueueRow {
    pub id: String,
    pub name: String,
    #[tabled(rename = "prefix")]
    pub ticket_prefix: String,
    #[tabled(rename = "avg min")]
    pub avg_service_minutes: u32,
    #[tabled(rename = "active")]
    pub is_active: bool,
    #[tabled(rename = "issued")]
    pub last_sequence: i64,
}

#[derive(Debug, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct TicketRow {
    pub number: String,
    pub status: String,
    pub priority: i32,
    #[tabled(rename = "est. wait")]
    pub estimated_wait_minutes: u32,
    #[tabled(rename = "agent", display_with = "display_option")]
    pub agent_id: Option<String>,
    pub id: String,
}

#[derive(Debug, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct StatsRow {
    #[tabled(rename = "queue")]
    pub queue_name: String,
    pub waiting: i64,
    pub serving: i64,
    pub served: i64,
    pub cancelled: i64,
    #[tabled(rename = "no-show")]
    pub no_show: i64,
}

pub fn bytes_to_mb(bytes: i64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabled::Table;

    #[test]
    fn test_ticket_row_from_daemon_json() {
        let row: TicketRow = serde_json::from_value(json!({
            "id": "t-1",
            "queueId": "q-1",
            "sequence": 3,
            "number": "A-3",
            "status": "waiting",
            "priority": 0,
            "estimatedWaitMinutes": 10,
            "createdAt": 1,
            "calledAt": null,
            "servedAt": null,
            "updatedAt": 1,
            "agentId": null
        }))
        .unwrap();

        let table = Table::new(vec![row]).to_string();
        assert!(table.contains("A-3"));
        assert!(table.contains("est. wait"));
        assert!(table.contains('-'));
    }

    #[test]
    fn test_stats_row_ignores_extra_fields() {
        let row: StatsRow = serde_json::from_value(json!({
            "queueId": "q-1",
            "queueName": "Front desk",
            "isActive": true,
            "waiting": 2,
            "serving": 1,
            "served": 5,
            "cancelled": 0,
            "noShow": 1
        }))
        .unwrap();
        assert_eq!(row.no_show, 1);
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(2 * 1024 * 1024), 2.0);
    }
}
