//! Ticket lifecycle through the services on the SQLite adapter

mod common;

use common::Harness;
use smartq_core::application::{IssueTicketRequest, Topic};
use smartq_core::domain::{QueuePatch, TicketStatus};
use smartq_core::error::ErrorKind;
use smartq_core::port::mocks::RecordingSubscriber;

#[tokio::test]
async fn test_issue_call_and_finish_in_service_order() {
    let h = Harness::in_memory().await;
    let queue = h.create_queue("Front desk", "A", 5).await;

    let mut issued = Vec::new();
    for _ in 0..3 {
        let ticket = h
            .tickets
            .issue_ticket(IssueTicketRequest::new(&queue.id))
            .await
            .unwrap();
        issued.push(ticket);
    }
    let numbers: Vec<_> = issued.iter().map(|t| t.number.as_str()).collect();
    assert_eq!(numbers, ["A-1", "A-2", "A-3"]);

    // Waiting count before each issue: 0, 1, 2
    let estimates: Vec<_> = issued.iter().map(|t| t.estimated_wait_minutes).collect();
    assert_eq!(estimates, [0, 0, 5]);

    let urgent = h
        .tickets
        .issue_ticket(IssueTicketRequest::new(&queue.id).with_priority(10))
        .await
        .unwrap();
    assert_eq!(urgent.number, "A-4");
    assert_eq!(h.tickets.ticket_status(&urgent.id).await.unwrap().position, 1);

    let first = h.tickets.call_next(&queue.id, "desk-1").await.unwrap().unwrap();
    assert_eq!(first.id, urgent.id);
    assert_eq!(first.status, TicketStatus::Serving);
    assert_eq!(first.agent_id.as_deref(), Some("desk-1"));

    // Same timestamp everywhere: the sequence decides
    let second = h.tickets.call_next(&queue.id, "desk-2").await.unwrap().unwrap();
    assert_eq!(second.id, issued[0].id);

    let view = h.tickets.ticket_status(&issued[2].id).await.unwrap();
    assert_eq!(view.position, 2);
    assert_eq!(view.ticket.status, TicketStatus::Waiting);

    let served = h.tickets.complete(&first.id).await.unwrap();
    assert_eq!(served.status, TicketStatus::Served);
    assert!(served.served_at.is_some());

    let no_show = h.tickets.no_show(&second.id).await.unwrap();
    assert_eq!(no_show.status, TicketStatus::NoShow);

    let cancelled = h.tickets.cancel(&issued[1].id).await.unwrap();
    assert_eq!(cancelled.status, TicketStatus::Cancelled);
    assert_eq!(h.tickets.ticket_status(&issued[2].id).await.unwrap().position, 1);

    let err = h.tickets.complete(&first.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let stats = h.tickets.stats(Some(&queue.id)).await.unwrap();
    assert_eq!(stats.len(), 1);
    let counts = &stats[0].counts;
    assert_eq!(
        (counts.waiting, counts.serving, counts.served, counts.cancelled, counts.no_show),
        (1, 0, 1, 1, 1)
    );

    h.close().await;
}

#[tokio::test]
async fn test_call_next_on_empty_and_unknown_queue() {
    let h = Harness::in_memory().await;
    let queue = h.create_queue("Pharmacy", "P", 4).await;

    assert!(h.tickets.call_next(&queue.id, "desk-1").await.unwrap().is_none());

    let err = h.tickets.call_next("missing", "desk-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    h.close().await;
}

#[tokio::test]
async fn test_closed_queue_refuses_tickets_but_drains() {
    let h = Harness::in_memory().await;
    let queue = h.create_queue("Returns", "R", 3).await;
    let ticket = h
        .tickets
        .issue_ticket(IssueTicketRequest::new(&queue.id))
        .await
        .unwrap();

    let closed = h
        .queues
        .update(
            &queue.id,
            QueuePatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!closed.is_active);
    assert_eq!(closed.last_sequence, 1);

    let err = h
        .tickets
        .issue_ticket(IssueTicketRequest::new(&queue.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let called = h.tickets.call_next(&queue.id, "desk-1").await.unwrap().unwrap();
    assert_eq!(called.id, ticket.id);

    assert!(h.queues.list(false).await.unwrap().is_empty());
    assert_eq!(h.queues.list(true).await.unwrap().len(), 1);

    h.close().await;
}

#[tokio::test]
async fn test_queue_delete_waits_for_an_empty_line() {
    let h = Harness::in_memory().await;
    let queue = h.create_queue("Lab", "L", 10).await;
    let ticket = h
        .tickets
        .issue_ticket(IssueTicketRequest::new(&queue.id))
        .await
        .unwrap();

    let err = h.queues.delete(&queue.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    h.tickets.cancel(&ticket.id).await.unwrap();
    h.queues.delete(&queue.id).await.unwrap();

    let err = h.queues.get(&queue.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = h.tickets.ticket_status(&ticket.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    h.close().await;
}

#[tokio::test]
async fn test_snapshot_lists_serving_before_waiting() {
    let h = Harness::in_memory().await;
    let queue = h.create_queue("Front desk", "A", 5).await;
    for priority in [0, 0, 50] {
        h.tickets
            .issue_ticket(IssueTicketRequest::new(&queue.id).with_priority(priority))
            .await
            .unwrap();
    }
    h.tickets.call_next(&queue.id, "desk-1").await.unwrap();

    let snapshot = h.queues.snapshot(&queue.id).await.unwrap();
    assert_eq!((snapshot.serving, snapshot.waiting), (1, 2));
    let numbers: Vec<_> = snapshot.tickets.iter().map(|t| t.number.as_str()).collect();
    assert_eq!(numbers, ["A-3", "A-1", "A-2"]);

    h.close().await;
}

#[tokio::test]
async fn test_events_reach_queue_and_ticket_subscribers() {
    let h = Harness::in_memory().await;
    let queue = h.create_queue("Front desk", "A", 5).await;

    let watcher = RecordingSubscriber::new(1);
    h.hub.subscribe(watcher.clone(), Topic::Queue(queue.id.clone()));

    let ticket = h
        .tickets
        .issue_ticket(IssueTicketRequest::new(&queue.id))
        .await
        .unwrap();

    let holder = RecordingSubscriber::new(2);
    h.hub.subscribe(holder.clone(), Topic::Ticket(ticket.id.clone()));
    // Subscribed to both topics, still one copy per event
    h.hub.subscribe(watcher.clone(), Topic::Ticket(ticket.id.clone()));

    h.tickets.call_next(&queue.id, "desk-1").await.unwrap();
    h.tickets.complete(&ticket.id).await.unwrap();
    h.queues
        .update(
            &queue.id,
            QueuePatch {
                name: Some("Main desk".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    h.queues.delete(&queue.id).await.unwrap();

    assert_eq!(
        watcher.event_types(),
        [
            "token_created",
            "token_called",
            "token_served",
            "queue_updated",
            "queue_deleted"
        ]
    );
    assert_eq!(holder.event_types(), ["token_called", "token_served"]);

    let called = &holder.events()[0];
    assert_eq!(called["payload"]["number"], "A-1");
    assert_eq!(called["payload"]["status"], "serving");
    assert_eq!(watcher.events()[4]["payload"]["queueId"], queue.id.as_str());

    h.close().await;
}
