// # State Store Implementations
//
// Implementations of the StateStore trait for different persistence
// strategies.

pub mod file;
pub mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

use crate::Result;
use crate::config::StateStoreConfig;
use crate::traits::StateStore;

/// Open the state store described by `config`
pub async fn open(config: &StateStoreConfig) -> Result<Box<dyn StateStore>> {
    match config {
        StateStoreConfig::File { path } => {
            tracing::debug!("Using file state store at {}", path);
            Ok(Box::new(FileStateStore::new(path).await?))
        }
        StateStoreConfig::Memory => {
            tracing::warn!("Using in-memory state store; nothing is kept after exit");
            Ok(Box::new(MemoryStateStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open(&StateStoreConfig::Memory).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = StateStoreConfig::File {
            path: path.display().to_string(),
        };

        let store = open(&config).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
