//! In-memory branch store, the single source of truth.
//!
//! A `BranchStore` is a cheap clone handle over the shared map. Connection
//! tasks run in parallel, so every operation takes the lock; `update` does
//! its read-modify-write under one write guard so two toggles cannot race.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::Branch;

#[derive(Debug, Clone, Default)]
pub struct BranchStore {
    inner: Arc<RwLock<BTreeMap<String, Branch>>>,
}

impl BranchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<Branch> {
        self.inner.read().await.get(id).cloned()
    }

    /// Insert or overwrite. The caller guarantees the record passed
    /// validation; nothing invalid ever reaches the map.
    pub async fn put(&self, branch: Branch) {
        self.inner.write().await.insert(branch.id.clone(), branch);
    }

    /// Remove a branch, returning it if it was present.
    pub async fn remove(&self, id: &str) -> Option<Branch> {
        self.inner.write().await.remove(id)
    }

    /// Atomic read-modify-write. Returns the updated record, or `None` when
    /// the id is unknown.
    pub async fn update<F>(&self, id: &str, f: F) -> Option<Branch>
    where
        F: FnOnce(&mut Branch),
    {
        let mut map = self.inner.write().await;
        let branch = map.get_mut(id)?;
        f(branch);
        Some(branch.clone())
    }

    /// All branches in stable id order.
    pub async fn list_all(&self) -> Vec<Branch> {
        self.inner.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
