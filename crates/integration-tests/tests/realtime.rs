//! Live updates from ticket actions to WebSocket clients

mod common;

use common::Harness;
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use smartq_api_ws::{WsGateway, WsGatewayConfig};
use smartq_core::application::IssueTicketRequest;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Stream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

async fn start_gateway(h: &Harness) -> (SocketAddr, watch::Sender<bool>) {
    let config = WsGatewayConfig {
        port: 0,
        ..Default::default()
    };
    let gateway = WsGateway::bind(&config, h.hub.clone()).await.unwrap();
    let addr = gateway.local_addr().unwrap();
    let (tx, rx) = watch::channel(false);
    tokio::spawn(gateway.run(rx));
    (addr, tx)
}

async fn subscribe(addr: SocketAddr, request: Value) -> Stream {
    let (client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
    let (mut tx, mut rx) = client.split();
    tx.send(Message::Text(request.to_string())).await.unwrap();
    let ack = next_event(&mut rx).await;
    assert!(ack["type"].as_str().unwrap().starts_with("subscribed_"));
    // Keep the write half alive for the rest of the test
    tokio::spawn(async move {
        let _tx = tx;
        std::future::pending::<()>().await;
    });
    rx
}

async fn next_event(rx: &mut Stream) -> Value {
    let frame = tokio::time::timeout(Duration::from_secs(5), rx.next())
        .await
        .expect("timed out waiting for an event")
        .unwrap()
        .unwrap();
    match frame {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("unexpected frame {:?}", other),
    }
}

#[tokio::test]
async fn test_ticket_holder_follows_their_ticket() {
    let h = Harness::in_memory().await;
    let (addr, _shutdown) = start_gateway(&h).await;
    let queue = h.create_queue("Front desk", "A", 5).await;

    let ticket = h
        .tickets
        .issue_ticket(IssueTicketRequest::new(&queue.id))
        .await
        .unwrap();
    let mut holder = subscribe(
        addr,
        serde_json::json!({"type": "subscribe_token", "tokenId": ticket.id}),
    )
    .await;

    h.tickets.call_next(&queue.id, "desk-3").await.unwrap();
    let called = next_event(&mut holder).await;
    assert_eq!(called["type"], "token_called");
    assert_eq!(called["payload"]["agentId"], "desk-3");

    h.tickets.no_show(&ticket.id).await.unwrap();
    let missed = next_event(&mut holder).await;
    assert_eq!(missed["type"], "token_no_show");
    assert_eq!(missed["payload"]["status"], "no-show");

    h.close().await;
}

#[tokio::test]
async fn test_queue_display_sees_the_whole_line() {
    let h = Harness::in_memory().await;
    let (addr, _shutdown) = start_gateway(&h).await;
    let queue = h.create_queue("Front desk", "A", 5).await;
    let other = h.create_queue("Pharmacy", "P", 3).await;

    let mut display = subscribe(
        addr,
        serde_json::json!({"type": "subscribe_queue", "queueId": queue.id}),
    )
    .await;

    h.tickets
        .issue_ticket(IssueTicketRequest::new(&other.id))
        .await
        .unwrap();
    let ticket = h
        .tickets
        .issue_ticket(IssueTicketRequest::new(&queue.id))
        .await
        .unwrap();
    h.tickets.cancel(&ticket.id).await.unwrap();

    let created = next_event(&mut display).await;
    assert_eq!(created["type"], "token_created");
    assert_eq!(created["payload"]["number"], "A-1");

    let cancelled = next_event(&mut display).await;
    assert_eq!(cancelled["type"], "token_cancelled");
    assert_eq!(cancelled["payload"]["id"], ticket.id.as_str());

    h.queues.delete(&queue.id).await.unwrap();
    let deleted = next_event(&mut display).await;
    assert_eq!(deleted["type"], "queue_deleted");
    assert_eq!(deleted["payload"]["queueId"], queue.id.as_str());

    h.close().await;
}
