//! In-memory ConfirmationStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ConfirmationStore, Result, StorageError};
use crate::model::{sort_newest_first, GuestConfirmation, NewConfirmation, RecordField};

/// Process-local store. Uniqueness of the contact key is checked under the
/// write lock, so `insert` is an atomic insert-if-absent.
#[derive(Default)]
pub struct MemoryConfirmationStore {
    /// Insertion order.
    records: RwLock<Vec<GuestConfirmation>>,
}

impl MemoryConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F>(&self, predicate: F) -> Vec<GuestConfirmation>
    where
        F: Fn(&GuestConfirmation) -> bool,
    {
        let records = self.records.read().await;
        let mut matched: Vec<_> = records.iter().rev().filter(|r| predicate(r)).cloned().collect();
        sort_newest_first(&mut matched);
        matched
    }
}

#[async_trait]
impl ConfirmationStore for MemoryConfirmationStore {
    async fn insert(&self, record: NewConfirmation) -> Result<GuestConfirmation> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.contact_key == record.contact_key.as_str())
        {
            return Err(StorageError::DuplicateKey {
                contact_key: record.contact_key.into_inner(),
            });
        }

        let stored = record.into_stored(Uuid::new_v4().to_string(), Utc::now());
        records.push(stored.clone());
        Ok(stored)
    }

    async fn query_all(&self) -> Result<Vec<GuestConfirmation>> {
        Ok(self.select(|_| true).await)
    }

    async fn query_by_field(
        &self,
        field: &RecordField,
        value: &str,
    ) -> Result<Vec<GuestConfirmation>> {
        Ok(self.select(|r| field.value_of(r) == Some(value)).await)
    }

    async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<GuestConfirmation>> {
        Ok(self.select(|r| r.submitted_at >= since).await)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
