//! `watch`: follow a queue or ticket over the WebSocket gateway

use anyhow::{Context, Result};
use colored::Colorize;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};

pub enum Target {
    Queue(String),
    Ticket(String),
}

impl Target {
    fn subscribe_message(&self) -> Value {
        match self {
            Target::Queue(id) => json!({ "type": "subscribe_queue", "queueId": id }),
            Target::Ticket(id) => json!({ "type": "subscribe_token", "tokenId": id }),
        }
    }
}

/// One line per event
fn describe(event: &Value) -> String {
    let kind = event["type"].as_str().unwrap_or("unknown");
    let payload = &event["payload"];

    match kind {
        "subscribed_queue" => format!("watching queue {}", event["queueId"].as_str().unwrap_or("?")),
        "subscribed_token" => format!("watching ticket {}", event["tokenId"].as_str().unwrap_or("?")),
        "queue_updated" => format!(
            "queue {} updated (active: {})",
            payload["name"].as_str().unwrap_or("?"),
            payload["isActive"]
        ),
        "queue_deleted" => format!("queue {} deleted", payload["queueId"].as_str().unwrap_or("?")),
        _ => {
            let number = payload["number"].as_str().unwrap_or("?");
            match kind {
                "token_created" => format!(
                    "{} joined the line (~{} min)",
                    number, payload["estimatedWaitMinutes"]
                ),
                "token_called" => format!(
                    "{} called by {}",
                    number,
                    payload["agentId"].as_str().unwrap_or("?")
                ),
                "token_served" => format!("{} served", number),
                "token_cancelled" => format!("{} cancelled", number),
                "token_no_show" => format!("{} did not show up", number),
                other => format!("{} {}", other, payload),
            }
        }
    }
}

/// Print events until the server closes the connection or Ctrl+C
pub async fn run(ws_url: &str, target: Target) -> Result<()> {
    let (mut socket, _) = connect_async(ws_url)
        .await
        .with_context(|| format!("Failed to connect to {}", ws_url))?;

    socket
        .send(Message::Text(target.subscribe_message().to_string()))
        .await
        .context("Failed to send subscription")?;

    loop {
        tokio::select! {
            frame = socket.next() => match frame {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<Value>(&text) {
                    Ok(event) => println!("{}", describe(&event).cyan()),
                    Err(_) => println!("{}", text.yellow()),
                },
                Some(Ok(Message::Close(_))) | None => {
                    println!("{}", "connection closed by server".yellow());
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("WebSocket error"),
            },
            _ = tokio::signal::ctrl_c() => {
                let _ = socket.close(None).await;
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_messages() {
        assert_eq!(
            Target::Queue("q-1".into()).subscribe_message(),
            json!({"type": "subscribe_queue", "queueId": "q-1"})
        );
        assert_eq!(
            Target::Ticket("t-1".into()).subscribe_message(),
            json!({"type": "subscribe_token", "tokenId": "t-1"})
        );
    }

    #[test]
    fn test_describe_events() {
        let called = json!({
            "type": "token_called",
            "payload": {"number": "A-4", "agentId": "desk-2"}
        });
        assert_eq!(describe(&called), "A-4 called by desk-2");

        let deleted = json!({"type": "queue_deleted", "payload": {"queueId": "q-1"}});
        assert_eq!(describe(&deleted), "queue q-1 deleted");

        let ack = json!({"type": "subscribed_token", "tokenId": "t-1"});
        assert_eq!(describe(&ack), "watching ticket t-1");
    }
}
