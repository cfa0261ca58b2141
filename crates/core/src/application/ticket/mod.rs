// Ticket Service - issuance, agent actions and lookups
//
// Every successful state change is announced through the broadcast hub
// after it is persisted. Delivery is fire-and-forget and never undoes the
// change.

pub mod call_next;
pub mod issue;
pub mod status;
pub mod transition;

pub use issue::IssueTicketRequest;
pub use status::{QueueStats, TicketStatusView};
pub use transition::Transition;

use crate::application::estimator::WaitEstimator;
use crate::application::hub::BroadcastHub;
use crate::application::ordering::OrderingEngine;
use crate::application::Repositories;
use crate::domain::{HubEvent, Ticket};
use crate::error::Result;
use crate::port::{IdProvider, TimeProvider};
use std::sync::Arc;

pub struct TicketService {
    repos: Repositories,
    ordering: OrderingEngine,
    estimator: WaitEstimator,
    hub: Arc<BroadcastHub>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl TicketService {
    pub fn new(
        repos: Repositories,
        estimator: WaitEstimator,
        hub: Arc<BroadcastHub>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            ordering: OrderingEngine::new(repos.tickets.clone()),
            repos,
            estimator,
            hub,
            id_provider,
            time_provider,
        }
    }

    pub fn ordering(&self) -> &OrderingEngine {
        &self.ordering
    }

    /// Issue a ticket and announce `token_created`
    pub async fn issue_ticket(&self, req: IssueTicketRequest) -> Result<Ticket> {
        let ticket = issue::execute(
            self.repos.issuance.as_ref(),
            &self.estimator,
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await?;

        self.hub.broadcast(&HubEvent::TokenCreated(ticket.clone()));
        Ok(ticket)
    }

    /// Ticket with its current position
    pub async fn ticket_status(&self, ticket_id: &str) -> Result<TicketStatusView> {
        status::ticket_status(self.repos.tickets.as_ref(), &self.ordering, ticket_id).await
    }

    /// Claim the next waiting ticket for `agent_id`
    ///
    /// `Ok(None)` when nobody is waiting.
    pub async fn call_next(&self, queue_id: &str, agent_id: &str) -> Result<Option<Ticket>> {
        let called = call_next::execute(
            self.repos.queues.as_ref(),
            self.repos.tickets.as_ref(),
            self.time_provider.as_ref(),
            queue_id,
            agent_id,
        )
        .await?;

        if let Some(ticket) = &called {
            self.hub.broadcast(&HubEvent::TokenCalled(ticket.clone()));
        }
        Ok(called)
    }

    pub async fn complete(&self, ticket_id: &str) -> Result<Ticket> {
        self.transition(ticket_id, Transition::Complete).await
    }

    pub async fn cancel(&self, ticket_id: &str) -> Result<Ticket> {
        self.transition(ticket_id, Transition::Cancel).await
    }

    pub async fn no_show(&self, ticket_id: &str) -> Result<Ticket> {
        self.transition(ticket_id, Transition::NoShow).await
    }

    async fn transition(&self, ticket_id: &str, transition: Transition) -> Result<Ticket> {
        let ticket = transition::execute(
            self.repos.tickets.as_ref(),
            self.time_provider.as_ref(),
            ticket_id,
            transition,
        )
        .await?;

        self.hub.broadcast(&transition.event(ticket.clone()));
        Ok(ticket)
    }

    /// Raw counts per status, for one queue or all of them
    pub async fn stats(&self, queue_id: Option<&str>) -> Result<Vec<QueueStats>> {
        status::stats(self.repos.queues.as_ref(), self.repos.tickets.as_ref(), queue_id).await
    }
}
