//! PostgreSQL implementation of the entry repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Entry, EntryCounts};
use crate::domain::repositories::EntryRepository;
use crate::domain::upsert::UpsertOutcome;
use crate::error::StoreError;

/// How many times an upsert re-reads after losing an insert race for a fresh id.
const INSERT_RACE_ATTEMPTS: usize = 3;

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    target: String,
    expires_at: i64,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Entry::new(row.id, row.target, row.expires_at)
    }
}

/// PostgreSQL entry store.
///
/// Upserts run in a single transaction: the stored row is locked with
/// `SELECT ... FOR UPDATE`, classified, and replaced only when the outcome is
/// `Created`. A fresh id has no row to lock, so the insert uses
/// `ON CONFLICT DO NOTHING` and the whole step is repeated if another writer
/// got there first.
///
/// Every call is bounded by `timeout`; exceeding it yields [`StoreError::Timeout`].
pub struct PgEntryRepository {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgEntryRepository {
    pub fn new(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(format!(
                "{} exceeded {}ms",
                operation,
                self.timeout.as_millis()
            ))),
        }
    }

    async fn upsert_in_transaction(
        &self,
        request: &Entry,
        now: i64,
    ) -> Result<UpsertOutcome, StoreError> {
        for attempt in 1..=INSERT_RACE_ATTEMPTS {
            let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

            let existing: Option<EntryRow> = sqlx::query_as(
                r#"
                SELECT id, target, expires_at
                FROM entries
                WHERE id = $1
                FOR UPDATE
                "#,
            )
            .bind(&request.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

            let had_row = existing.is_some();
            let outcome = UpsertOutcome::decide(existing.map(Entry::from), request, now);

            if !outcome.disposition.writes() {
                tx.commit().await.map_err(map_sqlx_error)?;
                return Ok(outcome);
            }

            if had_row {
                sqlx::query(
                    r#"
                    UPDATE entries
                    SET target = $2, expires_at = $3
                    WHERE id = $1
                    "#,
                )
                .bind(&request.id)
                .bind(&request.target)
                .bind(request.expires_at)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            } else {
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO entries (id, target, expires_at)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (id) DO NOTHING
                    "#,
                )
                .bind(&request.id)
                .bind(&request.target)
                .bind(request.expires_at)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?
                .rows_affected();

                if inserted == 0 {
                    tx.rollback().await.map_err(map_sqlx_error)?;
                    tracing::debug!(id = %request.id, attempt, "Lost insert race, re-reading row");
                    continue;
                }
            }

            tx.commit().await.map_err(map_sqlx_error)?;
            return Ok(outcome);
        }

        Err(StoreError::Query(format!(
            "upsert for '{}' lost {} consecutive insert races",
            request.id, INSERT_RACE_ATTEMPTS
        )))
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StoreError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_) => StoreError::InvalidData(message),
        _ => StoreError::Query(message),
    }
}

#[async_trait]
impl EntryRepository for PgEntryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Entry>, StoreError> {
        self.bounded("find_by_id", async {
            let row: Option<EntryRow> = sqlx::query_as(
                r#"
                SELECT id, target, expires_at
                FROM entries
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

            Ok(row.map(Entry::from))
        })
        .await
    }

    async fn upsert(&self, request: &Entry, now: i64) -> Result<UpsertOutcome, StoreError> {
        self.bounded("upsert", self.upsert_in_transaction(request, now))
            .await
    }

    async fn delete_expired(&self, now: i64, limit: i64) -> Result<u64, StoreError> {
        self.bounded("delete_expired", async {
            let result = sqlx::query(
                r#"
                DELETE FROM entries
                WHERE id IN (
                    SELECT id FROM entries
                    WHERE expires_at <= $1
                    ORDER BY expires_at
                    LIMIT $2
                    FOR UPDATE SKIP LOCKED
                )
                AND expires_at <= $1
                "#,
            )
            .bind(now)
            .bind(limit)
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

            Ok(result.rows_affected())
        })
        .await
    }

    async fn count(&self, now: i64) -> Result<EntryCounts, StoreError> {
        self.bounded("count", async {
            let (live, expired): (i64, i64) = sqlx::query_as(
                r#"
                SELECT
                    COUNT(*) FILTER (WHERE expires_at > $1),
                    COUNT(*) FILTER (WHERE expires_at <= $1)
                FROM entries
                "#,
            )
            .bind(now)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

            Ok(EntryCounts { live, expired })
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("ping", async {
            sqlx::query("SELECT 1")
                .execute(self.pool.as_ref())
                .await
                .map_err(map_sqlx_error)?;
            Ok(())
        })
        .await
    }
}
