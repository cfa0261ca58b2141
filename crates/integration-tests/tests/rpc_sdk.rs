//! SDK against a real JSON-RPC server on an ephemeral port

mod common;

use common::Harness;
use smartq_api_rpc::{
    RateLimitConfig, RpcHandler, RpcServer, RpcServerConfig, RpcServices, ServerHandle,
};
use smartq_core::port::{MaintenanceConfig, TimeProvider};
use smartq_infra_sqlite::SqliteMaintenance;
use smartq_sdk::{
    code, CreateQueueRequest, MaintenanceRequest, QueueUpdate, SmartQClient, TicketStatus,
};
use jsonrpsee::core::client::{ClientT, Error as ClientError};
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::HttpClientBuilder;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

async fn start_server(h: &Harness, rate_limit: RateLimitConfig) -> (SocketAddr, ServerHandle) {
    let time: Arc<dyn TimeProvider> = h.clock.clone();
    let services = RpcServices {
        tickets: h.tickets.clone(),
        queues: h.queues.clone(),
        hub: h.hub.clone(),
        maintenance: Arc::new(SqliteMaintenance::new(h.pool.clone(), time)),
        maintenance_config: MaintenanceConfig::default(),
    };
    let config = RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    RpcServer::new(config, RpcHandler::new(services, rate_limit))
        .start()
        .await
        .unwrap()
}

async fn serve(h: &Harness, rate_limit: RateLimitConfig) -> (SmartQClient, ServerHandle) {
    let (addr, handle) = start_server(h, rate_limit).await;
    let client = SmartQClient::connect(format!("http://{}", addr)).await.unwrap();
    (client, handle)
}

fn pharmacy() -> CreateQueueRequest {
    CreateQueueRequest {
        name: "Pharmacy".to_string(),
        description: Some("Prescriptions pickup".to_string()),
        ticket_prefix: "P".to_string(),
        avg_service_minutes: 4,
    }
}

#[tokio::test]
async fn test_full_service_over_rpc() {
    let h = Harness::in_memory().await;
    let (client, handle) = serve(&h, RateLimitConfig::default()).await;

    let queue = client.create_queue(pharmacy()).await.unwrap();
    assert_eq!(queue.ticket_prefix, "P");
    assert!(queue.is_active);

    let first = client.issue_ticket(&queue.id, 0).await.unwrap();
    let second = client.issue_ticket(&queue.id, 0).await.unwrap();
    assert_eq!(first.number, "P-1");
    assert_eq!(second.number, "P-2");
    assert_eq!(first.status, TicketStatus::Waiting);

    let view = client.ticket_status(&second.id).await.unwrap();
    assert_eq!(view.position, 2);

    let called = client.call_next(&queue.id, "window-1").await.unwrap().unwrap();
    assert_eq!(called.id, first.id);
    assert_eq!(called.status, TicketStatus::Serving);

    let snapshot = client.get_queue(&queue.id).await.unwrap();
    assert_eq!((snapshot.serving, snapshot.waiting), (1, 1));

    let served = client.complete(&first.id).await.unwrap();
    assert_eq!(served.status, TicketStatus::Served);
    let cancelled = client.cancel(&second.id).await.unwrap();
    assert_eq!(cancelled.status, TicketStatus::Cancelled);

    assert!(client.call_next(&queue.id, "window-1").await.unwrap().is_none());

    let stats = client.stats(Some(&queue.id)).await.unwrap();
    assert_eq!(stats.queues.len(), 1);
    assert_eq!(stats.queues[0].served, 1);
    assert_eq!(stats.queues[0].cancelled, 1);
    assert!(stats.db_size_bytes > 0);

    let updated = client
        .update_queue(
            &queue.id,
            QueueUpdate {
                avg_service_minutes: Some(6),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.avg_service_minutes, 6);
    assert_eq!(updated.last_sequence, 2);

    let deleted = client.delete_queue(&queue.id).await.unwrap();
    assert!(deleted.deleted);
    assert!(client.list_queues(true).await.unwrap().is_empty());

    handle.stop().unwrap();
    h.close().await;
}

#[tokio::test]
async fn test_errors_carry_daemon_codes() {
    let h = Harness::in_memory().await;
    let (client, handle) = serve(&h, RateLimitConfig::default()).await;

    let err = client.ticket_status("nope").await.unwrap_err();
    assert!(err.is_not_found());

    let queue = client.create_queue(pharmacy()).await.unwrap();
    let err = client.issue_ticket(&queue.id, 101).await.unwrap_err();
    assert_eq!(err.code(), Some(code::VALIDATION_ERROR));

    let ticket = client.issue_ticket(&queue.id, 0).await.unwrap();
    let err = client.complete(&ticket.id).await.unwrap_err();
    assert_eq!(err.code(), Some(code::INVALID_STATE));

    let err = client.delete_queue(&queue.id).await.unwrap_err();
    assert_eq!(err.code(), Some(code::CONFLICT));
    assert!(err.is_retryable());

    let mut bad = pharmacy();
    bad.ticket_prefix = String::new();
    let err = client.create_queue(bad).await.unwrap_err();
    assert_eq!(err.code(), Some(code::VALIDATION_ERROR));

    handle.stop().unwrap();
    h.close().await;
}

fn raw_params(fields: Value) -> ObjectParams {
    let mut params = ObjectParams::new();
    if let Value::Object(fields) = fields {
        for (key, value) in fields {
            params.insert(&key, value).unwrap();
        }
    }
    params
}

#[tokio::test]
async fn test_undecodable_params_are_validation_errors() {
    let h = Harness::in_memory().await;
    let (addr, handle) = start_server(&h, RateLimitConfig::default()).await;
    let raw = HttpClientBuilder::default()
        .build(format!("http://{}", addr))
        .unwrap();

    let negative_average = raw_params(json!({
        "name": "Pharmacy",
        "ticketPrefix": "P",
        "avgServiceMinutes": -5,
    }));
    let err = raw
        .request::<Value, _>("queue.create.v1", negative_average)
        .await
        .unwrap_err();
    match err {
        ClientError::Call(obj) => assert_eq!(obj.code(), code::VALIDATION_ERROR),
        other => panic!("unexpected error: {}", other),
    }

    let missing_queue = raw_params(json!({ "priority": 0 }));
    let err = raw
        .request::<Value, _>("ticket.issue.v1", missing_queue)
        .await
        .unwrap_err();
    match err {
        ClientError::Call(obj) => {
            assert_eq!(obj.code(), code::VALIDATION_ERROR);
            assert!(obj.message().contains("queueId"));
        }
        other => panic!("unexpected error: {}", other),
    }

    // Nothing was created by the rejected calls
    let client = SmartQClient::connect(format!("http://{}", addr)).await.unwrap();
    assert!(client.list_queues(true).await.unwrap().is_empty());

    handle.stop().unwrap();
    h.close().await;
}

#[tokio::test]
async fn test_mutations_are_throttled_reads_are_not() {
    let h = Harness::in_memory().await;
    let limits = RateLimitConfig {
        burst: 2,
        per_second: 0,
    };
    let (client, handle) = serve(&h, limits).await;

    let queue = client.create_queue(pharmacy()).await.unwrap();
    client.issue_ticket(&queue.id, 0).await.unwrap();

    let err = client.issue_ticket(&queue.id, 0).await.unwrap_err();
    assert_eq!(err.code(), Some(code::THROTTLED));

    // Reads still answer
    assert_eq!(client.list_queues(false).await.unwrap().len(), 1);
    assert_eq!(client.stats(None).await.unwrap().queues.len(), 1);

    handle.stop().unwrap();
    h.close().await;
}

#[tokio::test]
async fn test_manual_maintenance_purges_old_history() {
    let h = Harness::in_memory().await;
    let (client, handle) = serve(&h, RateLimitConfig::default()).await;

    let queue = client.create_queue(pharmacy()).await.unwrap();
    let ticket = client.issue_ticket(&queue.id, 0).await.unwrap();
    client.cancel(&ticket.id).await.unwrap();

    // Forty days later the cancelled ticket is past a 30-day retention
    h.clock.advance(40 * 24 * 60 * 60 * 1000);

    let report = client
        .maintenance(MaintenanceRequest {
            force_vacuum: true,
            retention_days: Some(30),
        })
        .await
        .unwrap();
    assert!(report.vacuum_run);
    assert_eq!(report.tickets_deleted, 1);

    let err = client.ticket_status(&ticket.id).await.unwrap_err();
    assert!(err.is_not_found());

    handle.stop().unwrap();
    h.close().await;
}
