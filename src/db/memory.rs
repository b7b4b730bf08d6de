use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RepoResult, RepositoryError, ReturnRepository};
use crate::models::ReturnRecord;

/// Process-local repository used when no database is configured, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryReturnRepository {
    rows: RwLock<BTreeMap<i64, ReturnRecord>>,
}

impl InMemoryReturnRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReturnRepository for InMemoryReturnRepository {
    async fn find_all(&self) -> RepoResult<Vec<ReturnRecord>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<ReturnRecord>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn insert(&self, record: &ReturnRecord) -> RepoResult<()> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&record.id) {
            return Err(RepositoryError::Duplicate(record.id));
        }
        rows.insert(record.id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &ReturnRecord) -> RepoResult<bool> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn max_id(&self) -> RepoResult<Option<i64>> {
        Ok(self.rows.read().await.keys().next_back().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let repo = InMemoryReturnRepository::new();
        repo.insert(&ReturnRecord::new_pending(1, "a", "b")).await.unwrap();
        let err = repo
            .insert(&ReturnRecord::new_pending(1, "c", "d"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(1)));
    }

    #[tokio::test]
    async fn max_id_tracks_highest_live_row() {
        let repo = InMemoryReturnRepository::new();
        assert_eq!(repo.max_id().await.unwrap(), None);

        for id in [4, 2, 9] {
            repo.insert(&ReturnRecord::new_pending(id, "x", "y")).await.unwrap();
        }
        assert_eq!(repo.max_id().await.unwrap(), Some(9));

        assert!(repo.delete(9).await.unwrap());
        assert_eq!(repo.max_id().await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn find_all_is_ordered_by_id() {
        let repo = InMemoryReturnRepository::new();
        for id in [3, 1, 2] {
            repo.insert(&ReturnRecord::new_pending(id, "x", "y")).await.unwrap();
        }
        let ids: Vec<i64> = repo.find_all().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn writes_to_missing_id_report_false() {
        let repo = InMemoryReturnRepository::new();
        assert!(!repo.delete(5).await.unwrap());
        assert!(!repo.update(&ReturnRecord::new_pending(5, "x", "y")).await.unwrap());
        assert!(repo.find_by_id(5).await.unwrap().is_none());
    }
}
