//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Confirmations table schema.
#[derive(Iden)]
pub enum Confirmations {
    Table,
    /// Insertion order, used to break timestamp ties.
    #[iden = "seq"]
    Seq,
    #[iden = "id"]
    Id,
    #[iden = "submitted_at"]
    SubmittedAt,
    #[iden = "full_name"]
    FullName,
    #[iden = "contact_key"]
    ContactKey,
    /// JSON object of choice field values.
    #[iden = "choices"]
    Choices,
}

/// SQL for creating the confirmations table.
pub const CREATE_CONFIRMATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS confirmations (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    submitted_at TEXT NOT NULL,
    full_name TEXT NOT NULL,
    contact_key TEXT NOT NULL,
    choices TEXT NOT NULL DEFAULT '{}'
)
"#;

/// Unique index enforcing one confirmation per contact key.
pub const CREATE_CONTACT_KEY_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_confirmations_contact_key
    ON confirmations(contact_key)
"#;

/// Index for newest-first listing.
pub const CREATE_SUBMITTED_AT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_confirmations_submitted_at
    ON confirmations(submitted_at)
"#;
