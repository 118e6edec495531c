//! RSVP confirmation workflow.
//!
//! Orchestrates one submission through validation, the duplicate guard,
//! the write and the refresh of the in-memory list:
//!
//! ```text
//! Idle -> Validating -> CheckingDuplicate -> Persisting -> Refreshing -> Idle
//!             |                |                  |
//!             +----------------+------------------+------> Idle (error)
//! ```
//!
//! Nothing is retried. State changes are published on a watch channel so a
//! presentation layer can re-render without polling.

mod error;
mod export;
mod projection;

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, EventConfig};
use crate::model::{sort_newest_first, ContactKey, GuestConfirmation, RecordField};
use crate::storage::{ConfirmationStore, StorageError};
use crate::validation::{FormInput, FormSchema};

pub use error::RsvpError;
pub use export::{ExportColumn, ExportLayout, ExportTable};
pub use projection::{ChoiceCount, ConfirmationListView, ConfirmationSummary};

/// Window used by callers that want "recent" confirmations without choosing one.
pub fn default_recent_window() -> Duration {
    Duration::hours(24)
}

/// Step of the submission currently in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    CheckingDuplicate,
    Persisting,
    Refreshing,
}

/// Observable workflow state.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub phase: SubmissionPhase,
    /// A full reload is in flight.
    pub loading: bool,
    pub view: ConfirmationListView,
    /// Set when the last load failed; the view is then empty.
    pub last_fetch_error: Option<String>,
}

pub struct RsvpWorkflow {
    store: Arc<dyn ConfirmationStore>,
    schema: FormSchema,
    layout: ExportLayout,
    state: watch::Sender<WorkflowState>,
}

impl RsvpWorkflow {
    pub fn new(store: Arc<dyn ConfirmationStore>, schema: FormSchema, layout: ExportLayout) -> Self {
        let (state, _) = watch::channel(WorkflowState::default());
        Self {
            store,
            schema,
            layout,
            state,
        }
    }

    /// Build the form schema and export layout from deployment config.
    pub fn from_config(
        store: Arc<dyn ConfirmationStore>,
        event: &EventConfig,
    ) -> Result<Self, ConfigError> {
        let schema = FormSchema::from_config(event)?;
        Ok(Self::new(store, schema, ExportLayout::from_config(event)))
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> ConfirmationListView {
        self.state.borrow().view.clone()
    }

    fn set_phase(&self, phase: SubmissionPhase) {
        self.state.send_modify(|s| s.phase = phase);
    }

    /// Reload every confirmation, newest first, and rebuild the view.
    ///
    /// Never fails: a store error yields an empty list and sets
    /// `last_fetch_error`.
    pub async fn load_all(&self) -> Vec<GuestConfirmation> {
        self.state.send_modify(|s| s.loading = true);

        match self.store.query_all().await {
            Ok(mut records) => {
                sort_newest_first(&mut records);
                debug!(count = records.len(), "Loaded confirmations");
                let view = ConfirmationListView::new(records.clone());
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.view = view;
                    s.last_fetch_error = None;
                });
                records
            }
            Err(e) => {
                error!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "Failed to load confirmations"
                );
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.view = ConfirmationListView::default();
                    s.last_fetch_error = Some(e.to_string());
                });
                Vec::new()
            }
        }
    }

    /// Whether a confirmation already uses `key`, after trimming.
    pub async fn exists_by_contact_key(&self, key: &str) -> Result<bool, StorageError> {
        let key = ContactKey::normalize(key);
        let matches = self
            .store
            .query_by_field(&RecordField::ContactKey, key.as_str())
            .await?;
        Ok(!matches.is_empty())
    }

    /// Record one confirmation.
    ///
    /// On success exactly one record was written and the view has been
    /// reloaded; on any error nothing was written. The phase is back to
    /// `Idle` when this returns.
    pub async fn submit(&self, input: FormInput) -> Result<GuestConfirmation, RsvpError> {
        let result = self.run_submission(input).await;
        self.set_phase(SubmissionPhase::Idle);
        result
    }

    async fn run_submission(&self, input: FormInput) -> Result<GuestConfirmation, RsvpError> {
        self.set_phase(SubmissionPhase::Validating);
        let record = match self.schema.validate(&input) {
            Ok(record) => record,
            Err(errors) => {
                warn!(%errors, "Rejected RSVP with invalid fields");
                return Err(errors.into());
            }
        };

        self.set_phase(SubmissionPhase::CheckingDuplicate);
        match self.exists_by_contact_key(record.contact_key.as_str()).await {
            Ok(false) => {}
            Ok(true) => {
                warn!(contact_key = %record.contact_key, "Contact key already confirmed");
                return Err(RsvpError::DuplicateContact {
                    contact_key: record.contact_key.into_inner(),
                });
            }
            Err(e) => {
                error!(error = %e, "Duplicate check failed");
                return Err(RsvpError::Persistence(e));
            }
        }

        self.set_phase(SubmissionPhase::Persisting);
        let stored = match self.store.insert(record).await {
            Ok(stored) => stored,
            Err(e) => {
                let err = RsvpError::from(e);
                match &err {
                    RsvpError::DuplicateContact { contact_key } => {
                        warn!(%contact_key, "Contact key confirmed concurrently")
                    }
                    other => error!(error = %other, "Failed to save confirmation"),
                }
                return Err(err);
            }
        };
        info!(
            id = %stored.id,
            contact_key = %stored.contact_key,
            backend = self.store.backend_name(),
            "Confirmation recorded"
        );

        self.set_phase(SubmissionPhase::Refreshing);
        self.load_all().await;

        Ok(stored)
    }

    /// Flat rows for the current view.
    pub fn export_snapshot(&self) -> ExportTable {
        self.layout.build(&self.state.borrow().view)
    }

    /// Confirmations submitted within `window` of now, newest first.
    ///
    /// Reads the store directly; like `load_all`, a store error yields an
    /// empty list.
    pub async fn recent(&self, window: Duration) -> Vec<GuestConfirmation> {
        let since = Utc::now() - window;
        match self.store.query_since(since).await {
            Ok(mut records) => {
                sort_newest_first(&mut records);
                records
            }
            Err(e) => {
                warn!(error = %e, "Failed to load recent confirmations");
                Vec::new()
            }
        }
    }
}
