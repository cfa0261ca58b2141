// Ticket Domain Model and lifecycle state machine

use super::error::{DomainError, Result};
use super::queue::QueueId;
use serde::{Deserialize, Serialize};

/// Ticket ID (UUID v4)
pub type TicketId = String;

/// Opaque reference to the calling agent (supplied by the identity layer)
pub type AgentId = String;

/// Priority (higher number = served sooner, 0 = normal)
pub type Priority = i32;

pub const MIN_PRIORITY: Priority = 0;
pub const MAX_PRIORITY: Priority = 100;

/// Ticket status
///
/// ```text
/// WAITING -> SERVING -> SERVED
///    |          |-----> NO_SHOW
///    +----------+-----> CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    Waiting,
    Serving,
    Served,
    Cancelled,
    NoShow,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::Waiting,
        TicketStatus::Serving,
        TicketStatus::Served,
        TicketStatus::Cancelled,
        TicketStatus::NoShow,
    ];

    /// Served, cancelled and no-show never change again
    pub fn is_final(self) -> bool {
        matches!(
            self,
            TicketStatus::Served | TicketStatus::Cancelled | TicketStatus::NoShow
        )
    }

    /// Parse the storage representation (see `Display`)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WAITING" => Some(TicketStatus::Waiting),
            "SERVING" => Some(TicketStatus::Serving),
            "SERVED" => Some(TicketStatus::Served),
            "CANCELLED" => Some(TicketStatus::Cancelled),
            "NO_SHOW" => Some(TicketStatus::NoShow),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Waiting => write!(f, "WAITING"),
            TicketStatus::Serving => write!(f, "SERVING"),
            TicketStatus::Served => write!(f, "SERVED"),
            TicketStatus::Cancelled => write!(f, "CANCELLED"),
            TicketStatus::NoShow => write!(f, "NO_SHOW"),
        }
    }
}

/// Ticket Entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub queue_id: QueueId,
    /// Per-queue sequence value backing `number`
    pub sequence: i64,
    /// Human readable number, e.g. `A-12`
    pub number: String,
    pub status: TicketStatus,
    pub priority: Priority,
    /// Predicted wait at issuance. Informational, never recomputed.
    pub estimated_wait_minutes: u32,

    pub created_at: i64, // epoch ms
    pub called_at: Option<i64>,
    pub served_at: Option<i64>,
    pub updated_at: i64,

    pub agent_id: Option<AgentId>,
}

impl Ticket {
    /// Create a new waiting ticket
    ///
    /// # Arguments
    ///
    /// * `id` - Unique ticket ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `queue_id` - Owning queue
    /// * `sequence` - Sequence value minted by the allocator
    /// * `number` - Formatted ticket number
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        queue_id: impl Into<String>,
        sequence: i64,
        number: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            sequence,
            number: number.into(),
            status: TicketStatus::Waiting,
            priority: 0,
            estimated_wait_minutes: 0,
            created_at,
            called_at: None,
            served_at: None,
            updated_at: created_at,
            agent_id: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_wait_minutes = minutes;
        self
    }

    /// WAITING -> SERVING (call-next only)
    pub fn call(&mut self, agent_id: impl Into<String>, now_millis: i64) -> Result<()> {
        self.guard_not_final()?;
        if self.status != TicketStatus::Waiting {
            return Err(DomainError::NotWaiting {
                ticket_id: self.id.clone(),
                status: self.status,
            });
        }
        let now = now_millis.max(self.created_at);
        self.status = TicketStatus::Serving;
        self.called_at = Some(now);
        self.agent_id = Some(agent_id.into());
        self.updated_at = now;
        Ok(())
    }

    /// SERVING -> SERVED
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.require_serving()?;
        let now = now_millis.max(self.called_at.unwrap_or(self.created_at));
        self.status = TicketStatus::Served;
        self.served_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// WAITING | SERVING -> CANCELLED
    pub fn cancel(&mut self, now_millis: i64) -> Result<()> {
        self.guard_not_final()?;
        self.status = TicketStatus::Cancelled;
        self.updated_at = now_millis.max(self.updated_at);
        Ok(())
    }

    /// SERVING -> NO_SHOW
    pub fn mark_no_show(&mut self, now_millis: i64) -> Result<()> {
        self.require_serving()?;
        self.status = TicketStatus::NoShow;
        self.updated_at = now_millis.max(self.updated_at);
        Ok(())
    }

    fn require_serving(&self) -> Result<()> {
        self.guard_not_final()?;
        if self.status != TicketStatus::Serving {
            return Err(DomainError::NotServing {
                ticket_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    fn guard_not_final(&self) -> Result<()> {
        if self.status.is_final() {
            return Err(DomainError::AlreadyFinal {
                ticket_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }
}
