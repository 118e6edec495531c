//! Backend factory for interface tests.
//!
//! Provides a unified interface to create confirmation stores based on
//! environment configuration.

use std::env;
use std::sync::Arc;

#[cfg(feature = "sqlite")]
use rsvp::storage::SqliteConfirmationStore;
use rsvp::storage::{ConfirmationStore, FileConfirmationStore, MemoryConfirmationStore};
use tempfile::TempDir;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
    File,
}

impl StorageBackend {
    pub fn from_env() -> Self {
        match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "sqlite" => StorageBackend::Sqlite,
            "file" => StorageBackend::File,
            _ => StorageBackend::Memory,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::File => "file",
        }
    }
}

/// Holds the store for a backend.
pub struct StorageContext {
    pub store: Arc<dyn ConfirmationStore>,
    /// Keeps the file backend's directory alive.
    #[allow(dead_code)]
    dir: Option<TempDir>,
}

impl std::fmt::Debug for StorageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageContext")
            .field("store", &self.store.backend_name())
            .field("dir", &self.dir)
            .finish()
    }
}

impl StorageContext {
    /// Create a fresh, empty store for the configured backend.
    pub async fn new(backend: StorageBackend) -> Self {
        match backend {
            StorageBackend::Memory => StorageContext {
                store: Arc::new(MemoryConfirmationStore::new()),
                dir: None,
            },
            StorageBackend::Sqlite => Self::create_sqlite().await,
            StorageBackend::File => Self::create_file().await,
        }
    }

    #[cfg(feature = "sqlite")]
    async fn create_sqlite() -> Self {
        use sqlx::sqlite::SqlitePoolOptions;

        // One connection, so every query sees the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create SQLite pool");

        let store = SqliteConfirmationStore::new(pool);
        store.init().await.expect("Failed to create schema");

        StorageContext {
            store: Arc::new(store),
            dir: None,
        }
    }

    #[cfg(not(feature = "sqlite"))]
    async fn create_sqlite() -> Self {
        panic!("SQLite feature not enabled. Build with --features sqlite");
    }

    async fn create_file() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = FileConfirmationStore::new(dir.path().join("confirmaciones.json"))
            .await
            .expect("Failed to open file store");

        StorageContext {
            store: Arc::new(store),
            dir: Some(dir),
        }
    }
}
