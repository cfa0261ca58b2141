// Domain Layer - Pure business logic and entities

pub mod error;
pub mod event;
pub mod ordering;
pub mod queue;
pub mod ticket;

// Re-exports
pub use error::DomainError;
pub use event::HubEvent;
pub use queue::{format_ticket_number, Queue, QueueId, QueuePatch, MAX_NAME_LEN, MAX_PREFIX_LEN};
pub use ticket::{AgentId, Priority, Ticket, TicketId, TicketStatus, MAX_PRIORITY, MIN_PRIORITY};
