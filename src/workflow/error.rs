//! Errors surfaced by the RSVP workflow.

use crate::storage::StorageError;
use crate::validation::ValidationErrors;

/// Why a submission was not recorded.
///
/// Every variant is recoverable: the next submission attempt is always
/// possible. Read-path failures never appear here; `load_all` degrades to
/// an empty list and flags `WorkflowState::last_fetch_error` instead.
#[derive(Debug, thiserror::Error)]
pub enum RsvpError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Contact key already registered: {contact_key}")]
    DuplicateContact { contact_key: String },

    #[error("Could not save confirmation: {0}")]
    Persistence(#[source] StorageError),
}

impl From<StorageError> for RsvpError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateKey { contact_key } => RsvpError::DuplicateContact { contact_key },
            other => RsvpError::Persistence(other),
        }
    }
}

impl RsvpError {
    /// Stable machine-readable kind, used in logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            RsvpError::Validation(_) => "validation",
            RsvpError::DuplicateContact { .. } => "duplicate_contact",
            RsvpError::Persistence(_) => "persistence",
        }
    }
}
