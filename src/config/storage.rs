//! Storage configuration types.

use serde::Deserialize;

/// Storage type discriminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Document table in a SQLite database.
    #[default]
    Sqlite,
    /// Single JSON blob on the local filesystem.
    File,
    /// Process-local, lost on restart.
    Memory,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Sqlite => "sqlite",
            StorageType::File => "file",
            StorageType::Memory => "memory",
        }
    }
}

/// Storage configuration (discriminated union).
///
/// Only one backend is active per deployment; records are never migrated
/// between them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// SQLite-specific configuration.
    pub sqlite: SqliteConfig,
    /// File-specific configuration.
    pub file: FileConfig,
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file path. Parent directories are created on startup.
    pub path: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "data/rsvp.db".to_string(),
        }
    }
}

/// File-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Path of the JSON document holding every confirmation.
    pub path: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: "data/confirmaciones.json".to_string(),
        }
    }
}
