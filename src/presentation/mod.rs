//! Presentation adapter over the RSVP workflow.
//!
//! Turns workflow state into something a display layer can render directly
//! and turns user gestures (submit, export, typing in the contact field) into
//! workflow calls. Business rules stay in the workflow; this layer only adds
//! banners, input masking, the busy guard and deadline display.

mod banner;
mod format;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{ChoiceField, EventConfig, MessagesConfig};
use crate::model::{ContactKeyKind, GuestConfirmation};
use crate::spreadsheet::{export_file_name, SpreadsheetWriter};
use crate::validation::{FieldError, FormInput};
use crate::workflow::{ChoiceCount, ConfirmationSummary, RsvpError, RsvpWorkflow};

pub use banner::{Banner, BannerBoard, BannerKind};
pub use format::{digits_only, long_date};

/// Everything a display layer renders, computed on read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenterView {
    pub title: String,
    pub subtitle: String,
    pub loading: bool,
    pub submitting: bool,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub confirmation_count: usize,
    pub formatted_deadline: String,
    pub deadline_passed: bool,
    pub contact_kind: ContactKeyKind,
    pub choices: Vec<ChoiceField>,
    /// The confirmation list could not be loaded and is shown empty.
    pub fetch_error: bool,
}

/// Summary plus per-field option breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(flatten)]
    pub summary: ConfirmationSummary,
    pub breakdown: Vec<FieldBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldBreakdown {
    pub field: String,
    pub label: String,
    pub options: Vec<ChoiceCount>,
}

#[derive(Debug)]
pub enum Rejection {
    /// Another submission from this adapter is still in flight.
    Busy,
    Failed(RsvpError),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Confirmed(GuestConfirmation),
    Rejected {
        /// Banner text shown to the guest.
        message: String,
        reason: Rejection,
    },
}

impl SubmitOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmitOutcome::Confirmed(_))
    }

    /// Field-level problems, when the submission failed validation.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SubmitOutcome::Rejected {
                reason: Rejection::Failed(RsvpError::Validation(errors)),
                ..
            } => &errors.fields,
            _ => &[],
        }
    }
}

/// A rejected [`RsvpPresenter::submit_detached`] call.
#[derive(Debug)]
pub struct FailedSubmission {
    /// Banner text for the client that submitted.
    pub message: String,
    pub error: RsvpError,
}

impl FailedSubmission {
    pub fn field_errors(&self) -> &[FieldError] {
        match &self.error {
            RsvpError::Validation(errors) => &errors.fields,
            _ => &[],
        }
    }
}

/// A rendered export ready for download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No confirmations to export")]
    Empty,

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct RsvpPresenter {
    workflow: Arc<RsvpWorkflow>,
    event: EventConfig,
    messages: MessagesConfig,
    banners: BannerBoard,
    submitting: AtomicBool,
}

impl RsvpPresenter {
    pub fn new(workflow: Arc<RsvpWorkflow>, event: EventConfig, messages: MessagesConfig) -> Self {
        let banners = BannerBoard::new(Duration::from_secs(messages.clear_after_secs));
        Self {
            workflow,
            event,
            messages,
            banners,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn workflow(&self) -> &Arc<RsvpWorkflow> {
        &self.workflow
    }

    pub fn event(&self) -> &EventConfig {
        &self.event
    }

    /// Initial load of the confirmation list.
    pub async fn init(&self) {
        let records = self.workflow.load_all().await;
        info!(
            count = records.len(),
            backend = self.workflow.backend_name(),
            "RSVP presenter ready"
        );
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Submit from this adapter's own form.
    ///
    /// Rejects with [`Rejection::Busy`] while a previous call is still in
    /// flight, and posts the outcome to the banner slot.
    pub async fn submit(&self, form: FormInput) -> SubmitOutcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Submission ignored while another is in flight");
            return SubmitOutcome::Rejected {
                message: self.messages.busy.clone(),
                reason: Rejection::Busy,
            };
        }
        let _guard = SubmittingGuard(&self.submitting);

        match self.submit_detached(form).await {
            Ok(stored) => {
                self.banners
                    .show(BannerKind::Success, self.messages.success.clone())
                    .await;
                SubmitOutcome::Confirmed(stored)
            }
            Err(FailedSubmission { message, error }) => {
                self.banners.show(BannerKind::Error, message.clone()).await;
                SubmitOutcome::Rejected {
                    message,
                    reason: Rejection::Failed(error),
                }
            }
        }
    }

    /// Submit on behalf of one of many remote clients.
    ///
    /// Neither the in-flight guard nor the banner slot is touched; the
    /// failure text travels in the error for the caller to hand back.
    pub async fn submit_detached(
        &self,
        form: FormInput,
    ) -> Result<GuestConfirmation, FailedSubmission> {
        self.workflow
            .submit(form)
            .await
            .map_err(|error| FailedSubmission {
                message: self.rejection_message(&error).to_string(),
                error,
            })
    }

    pub fn success_message(&self) -> &str {
        &self.messages.success
    }

    fn rejection_message(&self, err: &RsvpError) -> &str {
        match err {
            RsvpError::Validation(_) => &self.messages.validation,
            RsvpError::DuplicateContact { .. } => &self.messages.duplicate,
            RsvpError::Persistence(_) => &self.messages.persistence,
        }
    }

    pub fn formatted_deadline(&self) -> String {
        long_date(self.event.deadline, self.event.locale)
    }

    /// Recomputed on every call, never cached.
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        now > self.event.deadline_instant()
    }

    pub async fn view(&self, now: DateTime<Utc>) -> PresenterView {
        let state = self.workflow.state();
        let banner = self.banners.current().await;
        let (error_message, success_message) = match banner {
            Some(Banner {
                kind: BannerKind::Error,
                message,
            }) => (Some(message), None),
            Some(Banner {
                kind: BannerKind::Success,
                message,
            }) => (None, Some(message)),
            None => (None, None),
        };

        PresenterView {
            title: self.event.title.clone(),
            subtitle: self.event.subtitle.clone(),
            loading: state.loading,
            submitting: self.is_submitting(),
            error_message,
            success_message,
            confirmation_count: state.view.len(),
            formatted_deadline: self.formatted_deadline(),
            deadline_passed: self.deadline_passed(now),
            contact_kind: self.event.contact.kind,
            choices: self.workflow.schema().fields().to_vec(),
            fetch_error: state.last_fetch_error.is_some(),
        }
    }

    /// Input mask for the contact field: digits only, capped at the kind's
    /// maximum length.
    pub fn mask_contact_input(&self, raw: &str) -> String {
        digits_only(raw, self.event.contact.kind.max_input_len())
    }

    /// Description of a declared option, or an empty string.
    pub fn choice_description(&self, field: &str, value: &str) -> &str {
        self.workflow
            .schema()
            .field(field)
            .and_then(|f| f.option(value))
            .map(|o| o.description.as_str())
            .unwrap_or_default()
    }

    pub fn statistics(&self) -> Statistics {
        let view = self.workflow.view();
        let breakdown = self
            .workflow
            .schema()
            .fields()
            .iter()
            .filter(|f| !f.options.is_empty())
            .map(|f| FieldBreakdown {
                field: f.name.clone(),
                label: f.label.clone(),
                options: view.choice_breakdown(f),
            })
            .collect();

        Statistics {
            summary: view.summary(),
            breakdown,
        }
    }

    /// Render the current list with `writer`, named for `today`.
    ///
    /// An empty list also posts the empty-export banner.
    pub async fn export(
        &self,
        writer: &dyn SpreadsheetWriter,
        today: NaiveDate,
    ) -> Result<ExportFile, ExportError> {
        let result = self.render_export(writer, today);
        if let Err(ExportError::Empty) = result {
            self.banners
                .show(BannerKind::Error, self.messages.empty_export.clone())
                .await;
        }
        result
    }

    /// Render the current list without touching the banner slot.
    pub fn render_export(
        &self,
        writer: &dyn SpreadsheetWriter,
        today: NaiveDate,
    ) -> Result<ExportFile, ExportError> {
        let table = self.workflow.export_snapshot();
        if table.is_empty() {
            return Err(ExportError::Empty);
        }

        let bytes = writer.to_bytes(&table)?;
        let file_name = export_file_name(&self.event.export.file_prefix, today, writer.extension());
        info!(%file_name, rows = table.rows.len(), "Exported confirmations");

        Ok(ExportFile {
            file_name,
            content_type: writer.content_type(),
            bytes,
            row_count: table.rows.len(),
        })
    }
}
