//! Test utilities and mock implementations.
//!
//! Provides a confirmation store whose reads and writes can be made to fail
//! on demand, for exercising the workflow's error paths without a broken
//! database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::config::{EventConfig, MessagesConfig};
use crate::model::{GuestConfirmation, NewConfirmation, RecordField};
use crate::presentation::RsvpPresenter;
use crate::storage::{ConfirmationStore, MemoryConfirmationStore, Result, StorageError};
use crate::workflow::RsvpWorkflow;

/// In-memory confirmation store with failure injection.
#[derive(Default)]
pub struct MockConfirmationStore {
    inner: MemoryConfirmationStore,
    fail_on_insert: RwLock<bool>,
    fail_on_query: RwLock<bool>,
    insert_delay: RwLock<Duration>,
    insert_calls: AtomicUsize,
}

impl MockConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_insert(&self, fail: bool) {
        *self.fail_on_insert.write().await = fail;
    }

    pub async fn set_fail_on_query(&self, fail: bool) {
        *self.fail_on_query.write().await = fail;
    }

    /// Hold every insert for `delay` before writing.
    pub async fn set_insert_delay(&self, delay: Duration) {
        *self.insert_delay.write().await = delay;
    }

    /// Insert attempts, including rejected ones.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Records currently held, bypassing failure injection.
    pub async fn len(&self) -> usize {
        self.inner.query_all().await.map(|r| r.len()).unwrap_or(0)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn check_query(&self) -> Result<()> {
        if *self.fail_on_query.read().await {
            return Err(StorageError::Unavailable("query failure injected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ConfirmationStore for MockConfirmationStore {
    async fn insert(&self, record: NewConfirmation) -> Result<GuestConfirmation> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_on_insert.read().await {
            return Err(StorageError::Unavailable("insert failure injected".to_string()));
        }
        let delay = *self.insert_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.insert(record).await
    }

    async fn query_all(&self) -> Result<Vec<GuestConfirmation>> {
        self.check_query().await?;
        self.inner.query_all().await
    }

    async fn query_by_field(
        &self,
        field: &RecordField,
        value: &str,
    ) -> Result<Vec<GuestConfirmation>> {
        self.check_query().await?;
        self.inner.query_by_field(field, value).await
    }

    async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<GuestConfirmation>> {
        self.check_query().await?;
        self.inner.query_since(since).await
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

/// Workflow over `store` with the default deployment configuration.
pub fn workflow_with(store: Arc<dyn ConfirmationStore>) -> Arc<RsvpWorkflow> {
    match RsvpWorkflow::from_config(store, &EventConfig::default()) {
        Ok(workflow) => Arc::new(workflow),
        Err(e) => panic!("default event config must be valid: {}", e),
    }
}

/// Presenter over `store` with default configuration and the given banner
/// lifetime.
pub fn presenter_with(store: Arc<dyn ConfirmationStore>, clear_after_secs: u64) -> RsvpPresenter {
    let messages = MessagesConfig {
        clear_after_secs,
        ..MessagesConfig::default()
    };
    RsvpPresenter::new(workflow_with(store), EventConfig::default(), messages)
}
