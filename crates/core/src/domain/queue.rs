// Queue Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Queue identifier (UUID v4)
pub type QueueId = String;

/// Maximum queue name length
pub const MAX_NAME_LEN: usize = 64;

/// Maximum ticket prefix length ("A", "VIP", ...)
pub const MAX_PREFIX_LEN: usize = 3;

/// A named waiting line with its own ticket sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
    pub id: QueueId,
    pub name: String,
    pub description: Option<String>,
    pub ticket_prefix: String,
    /// Average minutes to serve one ticket (> 0)
    pub avg_service_minutes: u32,
    pub is_active: bool,
    /// Last issued sequence number. Only the allocator advances it.
    pub last_sequence: i64,
    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl Queue {
    /// Create a new, active queue with an untouched sequence
    ///
    /// `ticket_prefix` is upper-cased before validation.
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        name: impl Into<String>,
        ticket_prefix: impl AsRef<str>,
        avg_service_minutes: u32,
    ) -> Result<Self> {
        let queue = Self {
            id: id.into(),
            name: name.into().trim().to_string(),
            description: None,
            ticket_prefix: normalize_prefix(ticket_prefix.as_ref()),
            avg_service_minutes,
            is_active: true,
            last_sequence: 0,
            created_at,
            updated_at: created_at,
        };
        queue.validate()?;
        Ok(queue)
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    /// Check every editable field
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_prefix(&self.ticket_prefix)?;
        validate_avg_service(self.avg_service_minutes)?;
        Ok(())
    }

    /// Human readable ticket number for a sequence value
    pub fn format_number(&self, sequence: i64) -> String {
        format_ticket_number(&self.ticket_prefix, sequence)
    }

    /// Apply an administrative patch. The sequence is never touched.
    pub fn apply(&mut self, patch: QueuePatch, now_millis: i64) -> Result<()> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(prefix) = patch.ticket_prefix {
            self.ticket_prefix = normalize_prefix(&prefix);
        }
        if let Some(avg) = patch.avg_service_minutes {
            self.avg_service_minutes = avg;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        self.validate()?;
        self.updated_at = now_millis;
        Ok(())
    }
}

/// Partial update for a queue (admin edit)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ticket_prefix: Option<String>,
    #[serde(default)]
    pub avg_service_minutes: Option<u32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl QueuePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.ticket_prefix.is_none()
            && self.avg_service_minutes.is_none()
            && self.is_active.is_none()
    }
}

/// `prefix-sequence`, e.g. `A-101`
pub fn format_ticket_number(prefix: &str, sequence: i64) -> String {
    format!("{}-{}", prefix, sequence)
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim().to_ascii_uppercase()
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DomainError::Validation("Queue name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "Queue name too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN {
        return Err(DomainError::Validation(format!(
            "Ticket prefix must be 1-{} characters",
            MAX_PREFIX_LEN
        )));
    }
    if !prefix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err(DomainError::Validation(
            "Ticket prefix must be alphanumeric".to_string(),
        ));
    }
    Ok(())
}

fn validate_avg_service(avg: u32) -> Result<()> {
    if avg == 0 {
        return Err(DomainError::Validation(
            "Average service time must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_queue_normalizes_prefix() {
        let queue = Queue::new("q-1", 1000, "  Billing ", "b", 5).unwrap();
        assert_eq!(queue.name, "Billing");
        assert_eq!(queue.ticket_prefix, "B");
        assert_eq!(queue.last_sequence, 0);
        assert!(queue.is_active);
        assert_eq!(queue.format_number(101), "B-101");
    }

    #[test]
    fn test_rejects_zero_service_time() {
        let err = Queue::new("q-1", 1000, "Billing", "B", 0).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_rejects_bad_prefix() {
        assert!(Queue::new("q-1", 1000, "Billing", "", 5).is_err());
        assert!(Queue::new("q-1", 1000, "Billing", "ABCD", 5).is_err());
        assert!(Queue::new("q-1", 1000, "Billing", "A-", 5).is_err());
    }

    #[test]
    fn test_patch_keeps_sequence() {
        let mut queue = Queue::new("q-1", 1000, "Billing", "B", 5).unwrap();
        queue.last_sequence = 42;

        let patch = QueuePatch {
            avg_service_minutes: Some(8),
            is_active: Some(false),
            ..Default::default()
        };
        queue.apply(patch, 2000).unwrap();

        assert_eq!(queue.avg_service_minutes, 8);
        assert!(!queue.is_active);
        assert_eq!(queue.last_sequence, 42);
        assert_eq!(queue.updated_at, 2000);
    }

    #[test]
    fn test_invalid_patch_is_rejected() {
        let mut queue = Queue::new("q-1", 1000, "Billing", "B", 5).unwrap();
        let patch = QueuePatch {
            avg_service_minutes: Some(0),
            ..Default::default()
        };
        assert!(queue.apply(patch, 2000).is_err());
    }
}
