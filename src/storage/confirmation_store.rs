//! ConfirmationStore trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Result;
use crate::model::{GuestConfirmation, NewConfirmation, RecordField};

/// Interface for confirmation persistence.
///
/// Holds one record per confirmed guest. Records are created through
/// `insert` only; edits and removals happen out of band against the
/// backing store.
///
/// Every query returns records newest first by `submitted_at`, with ties
/// broken by insertion order (latest insert first).
///
/// Implementations:
/// - `SqliteConfirmationStore`: SQLite table with a unique contact key index
/// - `FileConfirmationStore`: single JSON document on local disk
/// - `MemoryConfirmationStore`: process-local, for development
/// - `MockConfirmationStore`: in-memory with failure injection for testing
#[async_trait]
pub trait ConfirmationStore: Send + Sync {
    /// Store a new confirmation.
    ///
    /// The store assigns the id and the `submitted_at` timestamp. Backends
    /// that can enforce contact key uniqueness atomically return
    /// `StorageError::DuplicateKey` instead of writing a second record.
    async fn insert(&self, record: NewConfirmation) -> Result<GuestConfirmation>;

    /// Retrieve every confirmation, newest first.
    async fn query_all(&self) -> Result<Vec<GuestConfirmation>>;

    /// Retrieve confirmations whose `field` equals `value` exactly.
    async fn query_by_field(
        &self,
        field: &RecordField,
        value: &str,
    ) -> Result<Vec<GuestConfirmation>>;

    /// Retrieve confirmations submitted at or after `since`, newest first.
    async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<GuestConfirmation>>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}
