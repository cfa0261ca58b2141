//! Contention on a file database with a multi-connection pool

mod common;

use common::Harness;
use smartq_core::application::{IssueTicketRequest, TicketService};
use smartq_core::domain::{Ticket, TicketStatus};
use smartq_core::error::Result;
use std::collections::HashSet;
use std::sync::Arc;

const ISSUERS: usize = 40;
const AGENTS: usize = 6;

async fn issue_with_retry(service: &TicketService, queue_id: &str) -> Result<Ticket> {
    loop {
        match service.issue_ticket(IssueTicketRequest::new(queue_id)).await {
            Err(e) if e.is_retryable() => tokio::task::yield_now().await,
            other => return other,
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issuance_gives_contiguous_sequences() {
    let h = Harness::on_disk().await;
    let queue = h.create_queue("Front desk", "A", 5).await;

    let mut handles = Vec::new();
    for _ in 0..ISSUERS {
        let service = Arc::clone(&h.tickets);
        let queue_id = queue.id.clone();
        handles.push(tokio::spawn(async move {
            issue_with_retry(&service, &queue_id).await
        }));
    }

    let mut sequences = Vec::new();
    let mut numbers = HashSet::new();
    for handle in handles {
        let ticket = handle.await.unwrap().unwrap();
        sequences.push(ticket.sequence);
        numbers.insert(ticket.number);
    }
    sequences.sort_unstable();

    let expected: Vec<i64> = (1..=ISSUERS as i64).collect();
    assert_eq!(sequences, expected);
    assert_eq!(numbers.len(), ISSUERS);
    assert_eq!(
        h.queues.get(&queue.id).await.unwrap().last_sequence,
        ISSUERS as i64
    );

    h.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_agents_racing_call_next_never_share_a_ticket() {
    let h = Harness::on_disk().await;
    let queue = h.create_queue("Front desk", "A", 5).await;

    let mut issued = HashSet::new();
    for _ in 0..30 {
        let ticket = issue_with_retry(&h.tickets, &queue.id).await.unwrap();
        issued.insert(ticket.id);
    }

    let mut handles = Vec::new();
    for agent in 0..AGENTS {
        let service = Arc::clone(&h.tickets);
        let queue_id = queue.id.clone();
        handles.push(tokio::spawn(async move {
            let agent_id = format!("desk-{}", agent);
            let mut claimed = Vec::new();
            loop {
                match service.call_next(&queue_id, &agent_id).await {
                    Ok(Some(ticket)) => claimed.push(ticket),
                    Ok(None) => return claimed,
                    Err(e) if e.is_retryable() => tokio::task::yield_now().await,
                    Err(e) => panic!("call_next failed: {}", e),
                }
            }
        }));
    }

    let mut claimed_ids = HashSet::new();
    let mut total = 0;
    for (agent, handle) in handles.into_iter().enumerate() {
        for ticket in handle.await.unwrap() {
            assert_eq!(ticket.status, TicketStatus::Serving);
            assert_eq!(ticket.agent_id, Some(format!("desk-{}", agent)));
            claimed_ids.insert(ticket.id);
            total += 1;
        }
    }

    assert_eq!(total, 30);
    assert_eq!(claimed_ids, issued);

    let stats = h.tickets.stats(Some(&queue.id)).await.unwrap();
    assert_eq!(stats[0].counts.waiting, 0);
    assert_eq!(stats[0].counts.serving, 30);

    h.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_queue_keeps_its_own_counter() {
    let h = Harness::on_disk().await;
    let a = h.create_queue("Front desk", "A", 5).await;
    let b = h.create_queue("Pharmacy", "P", 3).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = Arc::clone(&h.tickets);
        let queue_id = if i % 2 == 0 { a.id.clone() } else { b.id.clone() };
        handles.push(tokio::spawn(async move {
            issue_with_retry(&service, &queue_id).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(h.queues.get(&a.id).await.unwrap().last_sequence, 10);
    assert_eq!(h.queues.get(&b.id).await.unwrap().last_sequence, 10);

    h.close().await;
}
