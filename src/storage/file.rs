//! File-based ConfirmationStore.
//!
//! Keeps every confirmation in one JSON document, the local counterpart of a
//! browser's persisted key-value record:
//! ```text
//! {path}        {"confirmations": [ ...oldest first... ]}
//! {stem}.tmp    written first, then renamed over {path}
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{ConfirmationStore, Result, StorageError};
use crate::model::{sort_newest_first, GuestConfirmation, NewConfirmation, RecordField};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    confirmations: Vec<GuestConfirmation>,
}

/// Filesystem-backed confirmation store.
///
/// Writers are serialized by an async mutex and re-check the contact key
/// while holding it, so `insert` is insert-if-absent within one process.
pub struct FileConfirmationStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileConfirmationStore {
    /// Create a new file store.
    ///
    /// Creates the parent directory if it doesn't exist. The document itself
    /// is created on first insert.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, document: &Document) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &bytes).await?;
        fs::rename(&temp_path, &self.path).await?;
        debug!(
            path = %self.path.display(),
            records = document.confirmations.len(),
            "Wrote confirmation document"
        );
        Ok(())
    }

    async fn select<F>(&self, predicate: F) -> Result<Vec<GuestConfirmation>>
    where
        F: Fn(&GuestConfirmation) -> bool,
    {
        let document = self.read_document().await?;
        let mut matched: Vec<_> = document
            .confirmations
            .into_iter()
            .rev()
            .filter(|r| predicate(r))
            .collect();
        sort_newest_first(&mut matched);
        Ok(matched)
    }
}

#[async_trait]
impl ConfirmationStore for FileConfirmationStore {
    async fn insert(&self, record: NewConfirmation) -> Result<GuestConfirmation> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.read_document().await?;
        if document
            .confirmations
            .iter()
            .any(|r| r.contact_key == record.contact_key.as_str())
        {
            return Err(StorageError::DuplicateKey {
                contact_key: record.contact_key.into_inner(),
            });
        }

        let stored = record.into_stored(Uuid::new_v4().to_string(), Utc::now());
        document.confirmations.push(stored.clone());
        self.write_document(&document).await?;
        Ok(stored)
    }

    async fn query_all(&self) -> Result<Vec<GuestConfirmation>> {
        self.select(|_| true).await
    }

    async fn query_by_field(
        &self,
        field: &RecordField,
        value: &str,
    ) -> Result<Vec<GuestConfirmation>> {
        self.select(|r| field.value_of(r) == Some(value)).await
    }

    async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<GuestConfirmation>> {
        self.select(|r| r.submitted_at >= since).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
