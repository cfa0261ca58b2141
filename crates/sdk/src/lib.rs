//! SmartQ SDK - Rust Client Library
//!
//! Typed client for the SmartQ daemon's JSON-RPC interface.
//!
//! # Example
//!
//! ```no_run
//! use smartq_sdk::{CreateQueueRequest, SmartQClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SmartQClient::connect("http://127.0.0.1:9527").await?;
//!
//!     let queue = client
//!         .create_queue(CreateQueueRequest {
//!             name: "Front desk".to_string(),
//!             description: None,
//!             ticket_prefix: "F".to_string(),
//!             avg_service_minutes: 5,
//!         })
//!         .await?;
//!
//!     let ticket = client.issue_ticket(&queue.id, 0).await?;
//!     println!("{} (about {} min)", ticket.number, ticket.estimated_wait_minutes);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::SmartQClient;
pub use error::{code, Result, SdkError};
pub use types::{
    CallNextResponse, CreateQueueRequest, MaintenanceRequest, MaintenanceResponse, Queue,
    QueueDeleteResponse, QueueListResponse, QueueSnapshot, QueueStats, QueueUpdate,
    StatsResponse, Ticket, TicketStatus, TicketStatusView,
};
