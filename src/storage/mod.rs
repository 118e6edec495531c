//! Storage implementations.

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageConfig, StorageType};

mod confirmation_store;
pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use confirmation_store::ConfirmationStore;
pub use file::FileConfirmationStore;
pub use memory::MemoryConfirmationStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConfirmationStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Contact key already registered: {contact_key}")]
    DuplicateKey { contact_key: String },

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Initialize storage based on configuration.
///
/// The returned client is owned by the caller (normally the process entry
/// point) and injected into the workflow.
pub async fn init_storage(
    config: &StorageConfig,
) -> std::result::Result<Arc<dyn ConfirmationStore>, Box<dyn std::error::Error>> {
    info!(storage_type = config.storage_type.as_str(), "Initializing storage");

    match config.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            let path = &config.sqlite.path;
            if let Some(parent) = std::path::Path::new(path).parent() {
                std::fs::create_dir_all(parent)?;
            }

            let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path)).await?;

            let store = SqliteConfirmationStore::new(pool);
            store.init().await?;
            info!(path = %path, "SQLite confirmation store ready");

            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            tracing::error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err("sqlite feature not enabled".into())
        }
        StorageType::File => {
            let store = FileConfirmationStore::new(&config.file.path).await?;
            info!(path = %config.file.path, "File confirmation store ready");
            Ok(Arc::new(store))
        }
        StorageType::Memory => {
            info!("Memory confirmation store ready; records are lost on restart");
            Ok(Arc::new(MemoryConfirmationStore::new()))
        }
    }
}
