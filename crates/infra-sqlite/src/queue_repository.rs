// SQLite QueueRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use smartq_core::domain::{Queue, QueueId};
use smartq_core::error::Result;
use smartq_core::port::QueueRepository;
use sqlx::SqlitePool;

pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn insert(&self, queue: &Queue) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queues (
                id, name, description, ticket_prefix, avg_service_minutes,
                is_active, last_sequence, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&queue.id)
        .bind(&queue.name)
        .bind(&queue.description)
        .bind(&queue.ticket_prefix)
        .bind(i64::from(queue.avg_service_minutes))
        .bind(queue.is_active)
        .bind(queue.last_sequence)
        .bind(queue.created_at)
        .bind(queue.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &QueueId) -> Result<Option<Queue>> {
        let row = sqlx::query_as::<_, QueueRow>("SELECT * FROM queues WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(QueueRow::into_queue))
    }

    async fn list(&self, include_inactive: bool) -> Result<Vec<Queue>> {
        let rows: Vec<QueueRow> = sqlx::query_as(
            r#"
            SELECT * FROM queues
            WHERE ? OR is_active = 1
            ORDER BY name ASC
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(QueueRow::into_queue).collect())
    }

    async fn update(&self, queue: &Queue) -> Result<bool> {
        // last_sequence is deliberately absent: only issuance advances it
        let result = sqlx::query(
            r#"
            UPDATE queues
            SET name = ?, description = ?, ticket_prefix = ?,
                avg_service_minutes = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&queue.name)
        .bind(&queue.description)
        .bind(&queue.ticket_prefix)
        .bind(i64::from(queue.avg_service_minutes))
        .bind(queue.is_active)
        .bind(queue.updated_at)
        .bind(&queue.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &QueueId) -> Result<bool> {
        // Tickets go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM queues WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct QueueRow {
    id: String,
    name: String,
    description: Option<String>,
    ticket_prefix: String,
    avg_service_minutes: i64,
    is_active: bool,
    last_sequence: i64,
    created_at: i64,
    updated_at: i64,
}

impl QueueRow {
    fn into_queue(self) -> Queue {
        Queue {
            id: self.id,
            name: self.name,
            description: self.description,
            ticket_prefix: self.ticket_prefix,
            avg_service_minutes: u32::try_from(self.avg_service_minutes).unwrap_or(u32::MAX),
            is_active: self.is_active,
            last_sequence: self.last_sequence,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
