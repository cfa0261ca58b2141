//! SmartQ Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    CallNextResponse, CreateQueueRequest, MaintenanceRequest, MaintenanceResponse, Queue,
    QueueDeleteResponse, QueueListResponse, QueueSnapshot, QueueUpdate, StatsResponse, Ticket,
    TicketStatusView,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Encode a request struct as named JSON-RPC params
fn object_params<T: Serialize>(request: &T) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    match serde_json::to_value(request)? {
        Value::Object(fields) => {
            for (key, value) in fields {
                params.insert(&key, value)?;
            }
            Ok(params)
        }
        other => Err(SdkError::Other(format!(
            "request must serialize to an object, got {}",
            other
        ))),
    }
}

/// SmartQ daemon client
///
/// # Example
///
/// ```no_run
/// use smartq_sdk::SmartQClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SmartQClient::connect("http://127.0.0.1:9527").await?;
/// let ticket = client.issue_ticket("queue-id", 0).await?;
/// println!("Your number is {}", ticket.number);
/// # Ok(())
/// # }
/// ```
pub struct SmartQClient {
    client: HttpClient,
}

impl SmartQClient {
    /// Connect to the SmartQ daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9527`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(REQUEST_TIMEOUT)
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    async fn call<R, P>(&self, method: &str, request: &P) -> Result<R>
    where
        R: DeserializeOwned,
        P: Serialize,
    {
        let params = object_params(request)?;
        Ok(self.client.request(method, params).await?)
    }

    // ----- queues -----

    pub async fn create_queue(&self, request: CreateQueueRequest) -> Result<Queue> {
        self.call("queue.create.v1", &request).await
    }

    pub async fn list_queues(&self, include_inactive: bool) -> Result<Vec<Queue>> {
        let response: QueueListResponse = self
            .call("queue.list.v1", &json!({ "includeInactive": include_inactive }))
            .await?;
        Ok(response.queues)
    }

    /// Queue with its live line
    pub async fn get_queue(&self, queue_id: &str) -> Result<QueueSnapshot> {
        self.call("queue.get.v1", &json!({ "queueId": queue_id }))
            .await
    }

    pub async fn update_queue(&self, queue_id: &str, update: QueueUpdate) -> Result<Queue> {
        let mut request = serde_json::to_value(update)?;
        request["queueId"] = json!(queue_id);
        self.call("queue.update.v1", &request).await
    }

    pub async fn delete_queue(&self, queue_id: &str) -> Result<QueueDeleteResponse> {
        self.call("queue.delete.v1", &json!({ "queueId": queue_id }))
            .await
    }

    // ----- tickets -----

    /// Take a number; priority 0 (normal) to 100
    pub async fn issue_ticket(&self, queue_id: &str, priority: i32) -> Result<Ticket> {
        self.call(
            "ticket.issue.v1",
            &json!({ "queueId": queue_id, "priority": priority }),
        )
        .await
    }

    pub async fn ticket_status(&self, ticket_id: &str) -> Result<TicketStatusView> {
        self.call("ticket.status.v1", &json!({ "ticketId": ticket_id }))
            .await
    }

    /// Claim the next ticket for `agent_id`; `None` when nobody is waiting
    pub async fn call_next(&self, queue_id: &str, agent_id: &str) -> Result<Option<Ticket>> {
        let response: CallNextResponse = self
            .call(
                "ticket.call_next.v1",
                &json!({ "queueId": queue_id, "agentId": agent_id }),
            )
            .await?;
        Ok(response.ticket)
    }

    pub async fn complete(&self, ticket_id: &str) -> Result<Ticket> {
        self.ticket_action("ticket.complete.v1", ticket_id).await
    }

    pub async fn cancel(&self, ticket_id: &str) -> Result<Ticket> {
        self.ticket_action("ticket.cancel.v1", ticket_id).await
    }

    pub async fn no_show(&self, ticket_id: &str) -> Result<Ticket> {
        self.ticket_action("ticket.no_show.v1", ticket_id).await
    }

    async fn ticket_action(&self, method: &str, ticket_id: &str) -> Result<Ticket> {
        self.call(method, &json!({ "ticketId": ticket_id })).await
    }

    // ----- admin -----

    pub async fn stats(&self, queue_id: Option<&str>) -> Result<StatsResponse> {
        self.call("admin.stats.v1", &json!({ "queueId": queue_id }))
            .await
    }

    pub async fn maintenance(&self, request: MaintenanceRequest) -> Result<MaintenanceResponse> {
        self.call("admin.maintenance.v1", &request).await
    }
}
