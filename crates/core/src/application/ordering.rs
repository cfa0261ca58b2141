// Ordering Engine - next-to-serve and position-in-line over the ticket store

use crate::domain::{Ticket, TicketStatus};
use crate::error::Result;
use crate::port::TicketRepository;
use std::sync::Arc;

/// Read side of the canonical service order
///
/// Results are point-in-time snapshots; a concurrent call-next may change
/// them immediately.
pub struct OrderingEngine {
    tickets: Arc<dyn TicketRepository>,
}

impl OrderingEngine {
    pub fn new(tickets: Arc<dyn TicketRepository>) -> Self {
        Self { tickets }
    }

    /// Ticket that call-next would claim right now (does not claim it)
    pub async fn next_to_serve(&self, queue_id: &str) -> Result<Option<Ticket>> {
        self.tickets.peek_next(queue_id).await
    }

    /// 1-based position among waiting tickets; 0 when not waiting
    pub async fn position_of(&self, ticket: &Ticket) -> Result<i64> {
        if ticket.status != TicketStatus::Waiting {
            return Ok(0);
        }
        Ok(self.tickets.count_ahead(ticket).await? + 1)
    }

    /// Serving and waiting tickets in service order
    pub async fn waiting_line(&self, queue_id: &str) -> Result<Vec<Ticket>> {
        self.tickets
            .list_by_status(queue_id, &[TicketStatus::Waiting, TicketStatus::Serving])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::mocks::InMemoryStore;

    fn ticket(id: &str, priority: i32, created_at: i64, sequence: i64) -> Ticket {
        Ticket::new(id, created_at, "q", sequence, format!("A-{}", sequence)).with_priority(priority)
    }

    async fn engine_with(tickets: Vec<Ticket>) -> (OrderingEngine, InMemoryStore) {
        let store = InMemoryStore::new();
        for t in tickets {
            store.put_ticket(t).await;
        }
        (OrderingEngine::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_priority_beats_arrival() {
        let a = ticket("A", 0, 1, 2);
        let b = ticket("B", 2, 2, 3);
        let c = ticket("C", 2, 0, 1);
        let (engine, _) = engine_with(vec![a.clone(), b.clone(), c.clone()]).await;

        assert_eq!(engine.next_to_serve("q").await.unwrap().unwrap().id, "C");
        assert_eq!(engine.position_of(&c).await.unwrap(), 1);
        assert_eq!(engine.position_of(&b).await.unwrap(), 2);
        assert_eq!(engine.position_of(&a).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_peek_does_not_claim() {
        let (engine, _) = engine_with(vec![ticket("only", 0, 1, 1)]).await;

        let first = engine.next_to_serve("q").await.unwrap().unwrap();
        let again = engine.next_to_serve("q").await.unwrap().unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.status, TicketStatus::Waiting);
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let (engine, _) = engine_with(vec![]).await;
        assert!(engine.next_to_serve("q").await.unwrap().is_none());
        assert!(engine.waiting_line("q").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_position_one_is_next_to_serve() {
        let tickets: Vec<Ticket> = (0..10)
            .map(|i| ticket(&format!("t{}", i), (i % 3) as i32, 100 - i as i64, i as i64 + 1))
            .collect();
        let (engine, _) = engine_with(tickets.clone()).await;

        let next = engine.next_to_serve("q").await.unwrap().unwrap();
        assert_eq!(engine.position_of(&next).await.unwrap(), 1);

        let line = engine.waiting_line("q").await.unwrap();
        for (index, t) in line.iter().enumerate() {
            assert_eq!(engine.position_of(t).await.unwrap(), index as i64 + 1);
        }
    }

    #[tokio::test]
    async fn test_serving_ticket_is_in_line_but_has_no_position() {
        let mut serving = ticket("S", 0, 0, 1);
        serving.call("agent", 5).unwrap();
        let waiting = ticket("W", 0, 1, 2);
        let mut done = ticket("D", 0, 0, 3);
        done.cancel(2).unwrap();
        let (engine, _) = engine_with(vec![serving.clone(), waiting.clone(), done]).await;

        assert_eq!(engine.position_of(&serving).await.unwrap(), 0);
        assert_eq!(engine.position_of(&waiting).await.unwrap(), 1);

        let ids: Vec<String> = engine
            .waiting_line("q")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["S".to_string(), "W".to_string()]);
    }
}
