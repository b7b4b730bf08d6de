use async_trait::async_trait;
use sqlx::PgPool;

use super::{RepoResult, RepositoryError, ReturnRepository};
use crate::models::{ReturnRecord, ReturnStatus};

/// Row shape of the `returns` table; status and resolution are stored as text.
#[derive(Debug, sqlx::FromRow)]
struct ReturnRow {
    id: i64,
    item: String,
    reason: String,
    status: String,
    resolution: String,
}

impl TryFrom<ReturnRow> for ReturnRecord {
    type Error = RepositoryError;

    fn try_from(row: ReturnRow) -> Result<Self, Self::Error> {
        let status: ReturnStatus = row.status.parse().map_err(|_| {
            RepositoryError::Corrupt(format!("return {} has status {:?}", row.id, row.status))
        })?;
        let resolution = match row.resolution.as_str() {
            "" => None,
            other => Some(other.parse().map_err(|_| {
                RepositoryError::Corrupt(format!("return {} has resolution {:?}", row.id, other))
            })?),
        };

        Ok(ReturnRecord {
            id: row.id,
            item: row.item,
            reason: row.reason,
            status,
            resolution,
        })
    }
}

fn resolution_text(record: &ReturnRecord) -> &'static str {
    record.resolution.map(|r| r.as_str()).unwrap_or("")
}

pub struct PgReturnRepository {
    pool: PgPool,
}

impl PgReturnRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReturnRepository for PgReturnRepository {
    async fn find_all(&self) -> RepoResult<Vec<ReturnRecord>> {
        let rows = sqlx::query_as::<_, ReturnRow>(
            "SELECT id, item, reason, status, resolution FROM returns ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ReturnRecord::try_from).collect()
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<ReturnRecord>> {
        sqlx::query_as::<_, ReturnRow>(
            "SELECT id, item, reason, status, resolution FROM returns WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(ReturnRecord::try_from)
        .transpose()
    }

    async fn insert(&self, record: &ReturnRecord) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO returns (id, item, reason, status, resolution)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(&record.item)
        .bind(&record.reason)
        .bind(record.status.as_str())
        .bind(resolution_text(record))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(RepositoryError::Duplicate(record.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, record: &ReturnRecord) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE returns
            SET item       = $1,
                reason     = $2,
                status     = $3,
                resolution = $4
            WHERE id = $5
            "#,
        )
        .bind(&record.item)
        .bind(&record.reason)
        .bind(record.status.as_str())
        .bind(resolution_text(record))
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM returns WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn max_id(&self) -> RepoResult<Option<i64>> {
        let row: (Option<i64>,) = sqlx::query_as("SELECT MAX(id) FROM returns")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
