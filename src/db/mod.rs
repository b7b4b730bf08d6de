mod memory;
mod postgres;

pub use memory::InMemoryReturnRepository;
pub use postgres::PgReturnRepository;

use async_trait::async_trait;

use crate::models::ReturnRecord;

pub type RepoResult<T> = Result<T, RepositoryError>;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Insert hit an id that already belongs to a live record.
    #[error("id {0} is already held by a live return")]
    Duplicate(i64),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Durable storage of return records, keyed by integer id.
///
/// Each call is treated as atomic by the lifecycle manager. Writes that target
/// a missing id report `false` rather than failing, so the caller decides
/// whether that is a `NotFound`.
#[async_trait]
pub trait ReturnRepository: Send + Sync {
    /// All live records in ascending id order.
    async fn find_all(&self) -> RepoResult<Vec<ReturnRecord>>;

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<ReturnRecord>>;

    /// Insert with the record's own id. Fails with `Duplicate` on collision.
    async fn insert(&self, record: &ReturnRecord) -> RepoResult<()>;

    /// Overwrite the stored row with `record`; `false` when no row has its id.
    async fn update(&self, record: &ReturnRecord) -> RepoResult<bool>;

    /// Remove by id; `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> RepoResult<bool>;

    /// Highest id among live records, `None` when empty.
    async fn max_id(&self) -> RepoResult<Option<i64>>;
}
