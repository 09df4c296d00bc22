//! Local filesystem state backend.
//!
//! Keeps every target's last-seen value in one JSON object file. Intended
//! for development and for hosts without Redis.
//!
//! ```text
//! state.json
//! {
//!   "finfast": "4 rum, Storgatan 1,4 rum, Kungsgatan 3",
//!   "lundbergs": "Ledig lägenhet, 3 rum och kök"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::StateStore;

/// JSON-file state store.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a FileStore backed by the given file. The file is created on
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole state map, empty if the file doesn't exist.
    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the state map atomically (write to temp, then rename).
    async fn write_all(&self, state: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut state = self.read_all().await?;
        state.insert(key.to_string(), value.to_string());
        self.write_all(&state).await?;
        log::debug!("Wrote state for '{}' to {}", key, self.path.display());
        Ok(())
    }
}
