// SQLite Issuance Transaction

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use smartq_core::domain::Ticket;
use smartq_core::error::Result;
use smartq_core::port::{IssuanceTransaction, SequenceGrant, SequenceOutcome, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

pub struct SqliteIssuanceTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteIssuanceTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteIssuanceTransaction<'_> {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl IssuanceTransaction for SqliteIssuanceTransaction<'_> {
    async fn increment_sequence(&mut self, queue_id: &str) -> Result<SequenceOutcome> {
        // Single read-modify-write; takes the write lock for the rest of the transaction
        let granted: Option<(i64, String, i64)> = sqlx::query_as(
            r#"
            UPDATE queues
            SET last_sequence = last_sequence + 1
            WHERE id = ? AND is_active = 1
            RETURNING last_sequence, ticket_prefix, avg_service_minutes
            "#,
        )
        .bind(queue_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if let Some((sequence, ticket_prefix, avg)) = granted {
            return Ok(SequenceOutcome::Granted(SequenceGrant {
                sequence,
                ticket_prefix,
                avg_service_minutes: u32::try_from(avg).unwrap_or(u32::MAX),
            }));
        }

        // Nothing updated: tell a missing queue from a disabled one
        let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM queues WHERE id = ?")
            .bind(queue_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(match active {
            None => SequenceOutcome::QueueMissing,
            Some(_) => SequenceOutcome::QueueInactive,
        })
    }

    async fn count_waiting(&mut self, queue_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE queue_id = ? AND status = 'WAITING'",
        )
        .bind(queue_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn insert_ticket(&mut self, ticket: &Ticket) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, queue_id, sequence, number, status, priority,
                estimated_wait_minutes, created_at, called_at, served_at,
                updated_at, agent_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ticket.id)
        .bind(&ticket.queue_id)
        .bind(ticket.sequence)
        .bind(&ticket.number)
        .bind(ticket.status.to_string())
        .bind(ticket.priority)
        .bind(i64::from(ticket.estimated_wait_minutes))
        .bind(ticket.created_at)
        .bind(ticket.called_at)
        .bind(ticket.served_at)
        .bind(ticket.updated_at)
        .bind(&ticket.agent_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
