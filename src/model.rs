//! Guest confirmation records.
//!
//! A `GuestConfirmation` is created once per RSVP and never updated by this
//! crate. The id and the submission timestamp are assigned by the store at
//! write time; callers only ever hand the store a `NewConfirmation`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One confirmed guest, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestConfirmation {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    pub full_name: String,
    pub contact_key: String,
    /// Deployment-declared choice fields (meal, allergies, message), by name.
    #[serde(default)]
    pub choices: BTreeMap<String, String>,
}

/// A validated, normalized record ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConfirmation {
    pub full_name: String,
    pub contact_key: ContactKey,
    pub choices: BTreeMap<String, String>,
}

impl NewConfirmation {
    /// Materialize the stored form with store-assigned id and timestamp.
    pub fn into_stored(self, id: String, submitted_at: DateTime<Utc>) -> GuestConfirmation {
        GuestConfirmation {
            id,
            submitted_at,
            full_name: self.full_name,
            contact_key: self.contact_key.into_inner(),
            choices: self.choices,
        }
    }
}

/// The de-duplication key of a confirmation, always trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactKey(String);

impl ContactKey {
    /// Normalize a raw key. Only surrounding whitespace is removed; the
    /// comparison stays case-sensitive.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ContactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which identifier a deployment uses as its contact key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKeyKind {
    /// 10-digit mobile number.
    #[default]
    Phone,
    /// Numeric national ID document.
    IdDocument,
}

impl ContactKeyKind {
    /// Pattern applied when the deployment does not override it.
    pub fn default_pattern(&self) -> &'static str {
        match self {
            ContactKeyKind::Phone => r"^[0-9]{10}$",
            ContactKeyKind::IdDocument => r"^[0-9]{6,12}$",
        }
    }

    /// Longest input the masking filter lets through.
    pub fn max_input_len(&self) -> usize {
        match self {
            ContactKeyKind::Phone => 10,
            ContactKeyKind::IdDocument => 12,
        }
    }

    /// Column header used for exports.
    pub fn column_header(&self) -> &'static str {
        match self {
            ContactKeyKind::Phone => "Celular",
            ContactKeyKind::IdDocument => "Documento",
        }
    }

    /// Name of the form field carrying the key.
    pub fn field_name(&self) -> &'static str {
        match self {
            ContactKeyKind::Phone => "phone",
            ContactKeyKind::IdDocument => "document",
        }
    }
}

/// A field a store can be queried by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordField {
    FullName,
    ContactKey,
    Choice(String),
}

impl RecordField {
    /// Extract this field's value from a stored record.
    pub fn value_of<'a>(&self, record: &'a GuestConfirmation) -> Option<&'a str> {
        match self {
            RecordField::FullName => Some(record.full_name.as_str()),
            RecordField::ContactKey => Some(record.contact_key.as_str()),
            RecordField::Choice(name) => record.choices.get(name).map(String::as_str),
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordField::FullName => f.write_str("full_name"),
            RecordField::ContactKey => f.write_str("contact_key"),
            RecordField::Choice(name) => write!(f, "choices.{}", name),
        }
    }
}

/// Sort records newest first. Stable, so equal timestamps keep the caller's
/// order; backends pass records newest-insert-first to break ties.
pub fn sort_newest_first(records: &mut [GuestConfirmation]) {
    records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
}
