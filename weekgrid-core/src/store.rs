//! Key-value persistence for event buckets.
//!
//! The engine's only storage need is a durable get/set of JSON values
//! under named keys. [`KeyValueStore`] is that seam: the reconciliation
//! service receives an implementation by constructor and never reaches for
//! ambient global state. Missing keys read as `None`, which callers treat
//! as an empty bucket.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::WeekgridResult;

/// Bucket holding manually authored (and task-converted) events.
pub const MANUAL_EVENTS_KEY: &str = "manual-events";
/// Bucket holding externally synced events; replaced wholesale on sync.
pub const SYNCED_EVENTS_KEY: &str = "synced-events";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn read_value(&self, key: &str) -> WeekgridResult<Option<serde_json::Value>>;
    async fn write_value(&self, key: &str, value: serde_json::Value) -> WeekgridResult<()>;
}

/// File-backed store: one `<key>.json` per key under a root directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonFileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn read_value(&self, key: &str) -> WeekgridResult<Option<serde_json::Value>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_value(&self, key: &str, value: serde_json::Value) -> WeekgridResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        // Write to a sibling temp file and rename, so a reader observes
        // either the old bucket or the new one, never a partial write.
        let content = serde_json::to_string_pretty(&value)?;
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, self.path_for(key)).await?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn read_value(&self, key: &str) -> WeekgridResult<Option<serde_json::Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write_value(&self, key: &str, value: serde_json::Value) -> WeekgridResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
