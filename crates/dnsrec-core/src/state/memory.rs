// # Memory State Store
//
// In-memory implementation of StateStore.
//
// Nothing survives a restart: every declared resource is treated as absent
// on the next run and created again. Useful for tests and one-shot runs
// against a scratch domain.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;

use crate::traits::state_store::{ResourceState, StateStore};
use crate::Result;

/// In-memory state store implementation
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, ResourceState>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of resources in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, name: &str) -> Result<Option<ResourceState>> {
        let guard = self.inner.read().await;
        Ok(guard.get(name).cloned())
    }

    async fn put(&self, name: &str, state: &ResourceState) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.insert(name.to_string(), state.clone());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let guard = self.inner.read().await;
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn flush(&self) -> Result<()> {
        // Nothing is buffered
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{DomainId, RecordId, RecordIdentity};

    fn state(record: u64) -> ResourceState {
        ResourceState::unread(RecordIdentity::new(
            DomainId::new(1).unwrap(),
            RecordId::new(record).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStateStore::new();
        assert!(store.is_empty().await);

        store.put("www", &state(10)).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("www").await.unwrap(), Some(state(10)));

        store.remove("www").await.unwrap();
        assert!(store.get("www").await.unwrap().is_none());

        // Removing an unknown name is fine
        store.remove("www").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_list_sorted() {
        let store = MemoryStateStore::new();
        store.put("mail", &state(2)).await.unwrap();
        store.put("api", &state(1)).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["api", "mail"]);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = MemoryStateStore::new();
        let other = store.clone();
        store.put("www", &state(3)).await.unwrap();

        assert_eq!(other.get("www").await.unwrap(), Some(state(3)));
    }
}
