// SQLite TicketRepository Implementation
//
// Every ORDER BY and "ahead of" predicate here mirrors
// `smartq_core::domain::ordering`: priority DESC, created_at ASC, sequence ASC.

use crate::error::map_sqlx_error;
use crate::SqliteIssuanceTransaction;
use async_trait::async_trait;
use smartq_core::domain::{Ticket, TicketId, TicketStatus};
use smartq_core::error::{AppError, Result};
use smartq_core::port::{
    IssuanceTransaction, StatusCounts, TicketRepository, TransactionalTicketRepository,
};
use sqlx::SqlitePool;
use tracing::warn;

pub struct SqliteTicketRepository {
    pool: SqlitePool,
}

impl SqliteTicketRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for SqliteTicketRepository {
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(TicketRow::into_ticket).transpose()
    }

    async fn count_ahead(&self, ticket: &Ticket) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM tickets
            WHERE queue_id = ? AND status = 'WAITING' AND id != ?
              AND (
                    priority > ?
                 OR (priority = ? AND created_at < ?)
                 OR (priority = ? AND created_at = ? AND sequence < ?)
              )
            "#,
        )
        .bind(&ticket.queue_id)
        .bind(&ticket.id)
        .bind(ticket.priority)
        .bind(ticket.priority)
        .bind(ticket.created_at)
        .bind(ticket.priority)
        .bind(ticket.created_at)
        .bind(ticket.sequence)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn peek_next(&self, queue_id: &str) -> Result<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT * FROM tickets
            WHERE queue_id = ? AND status = 'WAITING'
            ORDER BY priority DESC, created_at ASC, sequence ASC
            LIMIT 1
            "#,
        )
        .bind(queue_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(TicketRow::into_ticket).transpose()
    }

    async fn list_by_status(&self, queue_id: &str, statuses: &[TicketStatus]) -> Result<Vec<Ticket>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            r#"
            SELECT * FROM tickets
            WHERE queue_id = ? AND status IN ({})
            ORDER BY priority DESC, created_at ASC, sequence ASC
            "#,
            placeholders
        );

        let mut query = sqlx::query_as::<_, TicketRow>(&sql).bind(queue_id);
        for status in statuses {
            query = query.bind(status.to_string());
        }

        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    async fn claim_next(&self, queue_id: &str, agent_id: &str, now_millis: i64) -> Result<Option<Ticket>> {
        // Select-and-claim in one statement: two callers can never get the same row.
        // MAX() keeps called_at >= created_at under clock skew.
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            UPDATE tickets
            SET status = 'SERVING',
                called_at = MAX(?, created_at),
                updated_at = MAX(?, created_at),
                agent_id = ?
            WHERE id = (
                SELECT id FROM tickets
                WHERE queue_id = ? AND status = 'WAITING'
                ORDER BY priority DESC, created_at ASC, sequence ASC
                LIMIT 1
            )
              AND status = 'WAITING'
            RETURNING *
            "#,
        )
        .bind(now_millis)
        .bind(now_millis)
        .bind(agent_id)
        .bind(queue_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(TicketRow::into_ticket).transpose()
    }

    async fn compare_and_set(&self, ticket: &Ticket, expected: TicketStatus) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET status = ?, called_at = ?, served_at = ?, updated_at = ?, agent_id = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(ticket.status.to_string())
        .bind(ticket.called_at)
        .bind(ticket.served_at)
        .bind(ticket.updated_at)
        .bind(&ticket.agent_id)
        .bind(&ticket.id)
        .bind(expected.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn status_counts(&self, queue_id: &str) -> Result<StatusCounts> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM tickets WHERE queue_id = ? GROUP BY status",
        )
        .bind(queue_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            match TicketStatus::parse(&status) {
                Some(status) => counts.add(status, n),
                None => warn!(status = %status, queue_id = %queue_id, "Unknown ticket status in storage"),
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl TransactionalTicketRepository for SqliteTicketRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn IssuanceTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteIssuanceTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TicketRow {
    id: String,
    queue_id: String,
    sequence: i64,
    number: String,
    status: String,
    priority: i32,
    estimated_wait_minutes: i64,
    created_at: i64,
    called_at: Option<i64>,
    served_at: Option<i64>,
    updated_at: i64,
    agent_id: Option<String>,
}

impl TicketRow {
    pub(crate) fn into_ticket(self) -> Result<Ticket> {
        let status = TicketStatus::parse(&self.status).ok_or_else(|| {
            AppError::Database(format!(
                "Ticket {} has unknown status {}",
                self.id, self.status
            ))
        })?;

        Ok(Ticket {
            id: self.id,
            queue_id: self.queue_id,
            sequence: self.sequence,
            number: self.number,
            status,
            priority: self.priority,
            estimated_wait_minutes: u32::try_from(self.estimated_wait_minutes).unwrap_or(0),
            created_at: self.created_at,
            called_at: self.called_at,
            served_at: self.served_at,
            updated_at: self.updated_at,
            agent_id: self.agent_id,
        })
    }
}
