//! Simple SDK Example
//!
//! Walks one ticket through a queue.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package smartq-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package smartq-sdk --example simple
//!    ```

use smartq_sdk::{CreateQueueRequest, SmartQClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("SmartQ SDK - Simple Example");
    println!("===========================\n");

    println!("1. Connecting to daemon...");
    let client = SmartQClient::connect("http://127.0.0.1:9527").await?;

    println!("2. Finding or creating the demo queue...");
    let queues = client.list_queues(false).await?;
    let queue = match queues.into_iter().find(|q| q.ticket_prefix == "X") {
        Some(queue) => queue,
        None => {
            client
                .create_queue(CreateQueueRequest {
                    name: "SDK demo".to_string(),
                    description: Some("Created by the SDK example".to_string()),
                    ticket_prefix: "X".to_string(),
                    avg_service_minutes: 3,
                })
                .await?
        }
    };
    println!("   queue {} ({})\n", queue.name, queue.id);

    println!("3. Taking a number...");
    let ticket = client.issue_ticket(&queue.id, 0).await?;
    let status = client.ticket_status(&ticket.id).await?;
    println!(
        "   {} - position {} - about {} min\n",
        ticket.number, status.position, ticket.estimated_wait_minutes
    );

    println!("4. Serving the line as agent 'sdk-example'...");
    while let Some(called) = client.call_next(&queue.id, "sdk-example").await? {
        println!("   now serving {}", called.number);
        client.complete(&called.id).await?;
    }

    let stats = client.stats(Some(&queue.id)).await?;
    if let Some(counts) = stats.queues.first() {
        println!(
            "\n   waiting {} / served {} / cancelled {}",
            counts.waiting, counts.served, counts.cancelled
        );
    }

    println!("\nExample completed successfully!");
    Ok(())
}
