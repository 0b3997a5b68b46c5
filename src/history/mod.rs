//! Prior-day baseline storage. The baseline is replaced wholesale by the
//! save-history action, never merged field-by-field.

use std::path::PathBuf;

use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{HistorySnapshot, HistoryStore, PricesError, Result};

/// File-backed store: one pretty-printed JSON document.
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self) -> Result<Option<HistorySnapshot>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PricesError::HistoryError(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        // A file that exists but does not parse is corrupt baseline data,
        // not an absent baseline; surface it instead of serving bad changes.
        let snapshot: HistorySnapshot = serde_json::from_str(&raw).map_err(|e| {
            PricesError::HistoryError(format!("corrupt history file {}: {}", self.path.display(), e))
        })?;

        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &HistorySnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| PricesError::HistoryError(e.to_string()))?;

        fs::write(&self.path, json).await.map_err(|e| {
            PricesError::HistoryError(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Saved history for {} to {}", snapshot.date, self.path.display());
        Ok(())
    }
}

/// In-process store. Resets on restart, which some deployments accept.
#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: RwLock<Option<HistorySnapshot>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> Result<Option<HistorySnapshot>> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, snapshot: &HistorySnapshot) -> Result<()> {
        *self.inner.write().await = Some(snapshot.clone());
        Ok(())
    }
}
