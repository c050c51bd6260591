mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// A store for named JSON snapshots, one document per key.
/// Each selection context persists under its own well-known key and
/// rehydrates from it at startup.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Write (create or overwrite) a snapshot.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError>;

    /// Read a snapshot. Returns `StoreError::NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Delete a snapshot. No-op if absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Read a snapshot, returning `None` if it does not exist.
    async fn get_opt(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        match self.get(key).await {
            Ok(data) => Ok(Some(data)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check if a snapshot exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        match self.get(key).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Serialize `value` and write it under `key`.
pub async fn put_json<T: serde::Serialize>(
    store: &dyn SnapshotStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let data = serde_json::to_vec(value)
        .map_err(|e| StoreError::Internal(format!("encode {key}: {e}")))?;
    store.put(key, Bytes::from(data)).await
}

/// Read and decode the snapshot under `key`. Returns `None` when the key
/// is absent; a present-but-undecodable snapshot is an error (callers
/// rehydrating state treat both as "use the default").
pub async fn get_json<T: serde::de::DeserializeOwned>(
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get_opt(key).await? {
        Some(data) => serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| StoreError::Internal(format!("decode {key}: {e}"))),
        None => Ok(None),
    }
}

// -- Well-known snapshot keys --

pub const SESSION_STORAGE: &str = "session-storage";
pub const PROJECT_STORAGE: &str = "project-storage";
pub const DESIGN_STORAGE: &str = "design-storage";
pub const FINISHES_IDS_STORAGE: &str = "finishes-ids-storage";
pub const TASK_CATEGORY_STORAGE: &str = "task-category-storage";
pub const STEP_DATA_STORAGE: &str = "step-data-storage";

// -- Configuration --

/// Configuration for the snapshot store backend.
#[derive(Default)]
pub struct StoreConfig {
    /// Local filesystem base directory. When `None`, a default under the
    /// user's data dir is used.
    pub data_dir: Option<String>,
    /// Keep everything in memory; nothing survives the process.
    pub ephemeral: bool,
}

impl StoreConfig {
    /// Build from environment variables (`SITETRACK_DATA_DIR`,
    /// `SITETRACK_EPHEMERAL`).
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("SITETRACK_DATA_DIR").ok(),
            ephemeral: std::env::var("SITETRACK_EPHEMERAL")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

// -- Factory --

/// Create a `SnapshotStore` from configuration.
pub fn create_store(config: &StoreConfig) -> Arc<dyn SnapshotStore> {
    if config.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(LocalStore::new(config))
    }
}
