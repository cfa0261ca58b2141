// Domain Error Types

use super::TicketStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Ticket {ticket_id} is not waiting (status: {status})")]
    NotWaiting {
        ticket_id: String,
        status: TicketStatus,
    },

    #[error("Ticket {ticket_id} is not being served (status: {status})")]
    NotServing {
        ticket_id: String,
        status: TicketStatus,
    },

    #[error("Ticket {ticket_id} is already final (status: {status})")]
    AlreadyFinal {
        ticket_id: String,
        status: TicketStatus,
    },

    #[error("Queue is not active: {0}")]
    QueueInactive(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
