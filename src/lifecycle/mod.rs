//! Return lifecycle: status transitions, undoable deletion and id recycling.
//!
//! The undo history and the pool of released ids are transient process state.
//! Both sit behind one mutex, and every operation that touches them holds it
//! across its repository calls. Side effects always run in the order
//! validate → repository write → stack/pool mutation, so a failed write leaves
//! the in-memory state as it was.
//!
//! approve and disapprove take the same mutex: they rewrite the whole row, so a
//! delete followed by a create recycling the id must not slip in between their
//! read and their write.
//!
//! Undo reinserts a snapshot with its original id and never consults the
//! allocator, so the id stays in the pool after restoration. Two collisions
//! follow from that and are surfaced as `StorageFailure` (HTTP 409):
//! - a create before the undo takes the recycled id, and the undo then finds
//!   it occupied; the snapshot stays on the stack;
//! - an undo before the next create leaves a live id on top of the pool, and
//!   the create then finds it occupied; that stale id is dropped from the pool.

mod allocator;
mod stack;

pub use allocator::{Allocation, IdAllocator};
pub use stack::Stack;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::db::{RepositoryError, ReturnRepository};
use crate::error::{AppError, AppResult};
use crate::models::{Resolution, ReturnRecord};

#[derive(Debug, Default)]
struct DeletionLedger {
    undo: Stack<ReturnRecord>,
    ids: IdAllocator,
}

/// Read-only view of the transient deletion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub undo_depth: usize,
    /// Next-to-reuse first.
    pub released_ids: Vec<i64>,
    /// The id the next create would receive.
    pub next_id: i64,
    /// Set when `next_id` is a recycled id that an undo has made live again;
    /// the next create will fail with a collision on it.
    pub next_id_in_use: bool,
}

/// Owns the repository handle and the shared deletion ledger. Built once at
/// startup and shared with handlers through `Arc`.
pub struct ReturnLifecycle {
    repo: Arc<dyn ReturnRepository>,
    ledger: Mutex<DeletionLedger>,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Return {} not found", id))
}

impl ReturnLifecycle {
    pub fn new(repo: Arc<dyn ReturnRepository>) -> Self {
        Self {
            repo,
            ledger: Mutex::new(DeletionLedger::default()),
        }
    }

    pub async fn list_all(&self) -> AppResult<Vec<ReturnRecord>> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<ReturnRecord> {
        self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Creates a Pending return under the next allocated id.
    pub async fn create(&self, item: &str, reason: &str) -> AppResult<ReturnRecord> {
        if item.trim().is_empty() {
            return Err(AppError::InvalidArgument("item must not be empty".to_string()));
        }

        let mut ledger = self.ledger.lock().await;
        let max_live = if ledger.ids.has_released() {
            None
        } else {
            self.repo.max_id().await?
        };
        let allocation = ledger.ids.allocate(max_live);
        let record = ReturnRecord::new_pending(allocation.id(), item, reason);

        match self.repo.insert(&record).await {
            Ok(()) => {
                ledger.ids.commit(allocation);
                debug!(id = record.id, ?allocation, "Allocated return id");
                Ok(record)
            }
            Err(RepositoryError::Duplicate(id)) if matches!(allocation, Allocation::Recycled(_)) => {
                warn!(
                    id,
                    "Recycled id is held by a return restored through undo; dropping it from the pool"
                );
                ledger.ids.discard(id);
                Err(RepositoryError::Duplicate(id).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Approves with `resolution`, which must be exactly `item` or `money`.
    pub async fn approve(&self, id: i64, resolution: &str) -> AppResult<ReturnRecord> {
        let resolution: Resolution = resolution.parse()?;

        let _ledger = self.ledger.lock().await;
        let mut record = self.get(id).await?;
        record.approve(resolution);
        self.store(record).await
    }

    pub async fn disapprove(&self, id: i64) -> AppResult<ReturnRecord> {
        let _ledger = self.ledger.lock().await;
        let mut record = self.get(id).await?;
        record.disapprove();
        self.store(record).await
    }

    async fn store(&self, record: ReturnRecord) -> AppResult<ReturnRecord> {
        if !self.repo.update(&record).await? {
            return Err(not_found(record.id));
        }
        Ok(record)
    }

    /// Deletes a return, keeping its full snapshot for undo and releasing its id.
    pub async fn delete(&self, id: i64) -> AppResult<i64> {
        let mut ledger = self.ledger.lock().await;

        let snapshot = self.get(id).await?;
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }

        ledger.undo.push(snapshot);
        ledger.ids.release(id);
        debug!(id, undo_depth = ledger.undo.len(), "Recorded deletion");
        Ok(id)
    }

    /// Restores the most recently deleted return exactly as it was.
    pub async fn undo_delete(&self) -> AppResult<ReturnRecord> {
        let mut ledger = self.ledger.lock().await;

        let snapshot = ledger.undo.peek().cloned().ok_or(AppError::EmptyUndo)?;
        if let Err(e) = self.repo.insert(&snapshot).await {
            if let RepositoryError::Duplicate(id) = e {
                warn!(
                    id,
                    "Undo target id was recycled by a newer return; snapshot kept on the stack"
                );
            }
            return Err(e.into());
        }

        ledger.undo.pop();
        Ok(snapshot)
    }

    pub async fn ledger(&self) -> AppResult<LedgerSnapshot> {
        let ledger = self.ledger.lock().await;
        let max_live = if ledger.ids.has_released() {
            None
        } else {
            self.repo.max_id().await?
        };

        let next = ledger.ids.allocate(max_live);
        let next_id_in_use = match next {
            Allocation::Recycled(id) => self.repo.find_by_id(id).await?.is_some(),
            Allocation::Fresh(_) => false,
        };

        Ok(LedgerSnapshot {
            undo_depth: ledger.undo.len(),
            released_ids: ledger.ids.released(),
            next_id: next.id(),
            next_id_in_use,
        })
    }
}
