//! In-memory read projection of the confirmation store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ChoiceField;
use crate::model::GuestConfirmation;

/// Every confirmation, newest first.
///
/// Rebuilt wholesale after each load; never patched in place. Cloning is
/// cheap, the records are shared.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationListView {
    records: Arc<[GuestConfirmation]>,
}

/// Aggregate numbers over the current view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationSummary {
    pub total: usize,
    /// field name -> stored value -> count
    pub by_choice: BTreeMap<String, BTreeMap<String, usize>>,
    pub latest_at: Option<DateTime<Utc>>,
}

/// Count of one option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceCount {
    pub value: String,
    pub label: String,
    pub count: usize,
    /// Share of all confirmations, rounded to the nearest integer.
    pub percentage: u32,
}

impl ConfirmationListView {
    /// Records must already be ordered newest first.
    pub fn new(records: Vec<GuestConfirmation>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GuestConfirmation> {
        self.records.iter()
    }

    pub fn records(&self) -> &[GuestConfirmation] {
        &self.records
    }

    pub fn latest(&self) -> Option<&GuestConfirmation> {
        self.records.first()
    }

    pub fn summary(&self) -> ConfirmationSummary {
        let mut by_choice: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for record in self.iter() {
            for (field, value) in &record.choices {
                *by_choice
                    .entry(field.clone())
                    .or_default()
                    .entry(value.clone())
                    .or_insert(0) += 1;
            }
        }

        ConfirmationSummary {
            total: self.len(),
            by_choice,
            latest_at: self.latest().map(|r| r.submitted_at),
        }
    }

    /// Per-option counts for `field`.
    ///
    /// Declared options come first in declaration order, zero counts
    /// included; stored values that are not declared follow, sorted. Empty
    /// when there are no confirmations.
    pub fn choice_breakdown(&self, field: &ChoiceField) -> Vec<ChoiceCount> {
        let total = self.len();
        if total == 0 {
            return Vec::new();
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in self.iter().filter_map(|r| r.choices.get(&field.name)) {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }

        let percentage = |count: usize| ((count as f64 / total as f64) * 100.0).round() as u32;

        let mut breakdown: Vec<ChoiceCount> = field
            .options
            .iter()
            .map(|option| {
                let count = counts.remove(option.value.as_str()).unwrap_or(0);
                ChoiceCount {
                    value: option.value.clone(),
                    label: option.export_label().to_string(),
                    count,
                    percentage: percentage(count),
                }
            })
            .collect();

        breakdown.extend(counts.into_iter().map(|(value, count)| ChoiceCount {
            value: value.to_string(),
            label: value.to_string(),
            count,
            percentage: percentage(count),
        }));

        breakdown
    }

    /// Case-insensitive substring match on the guest name.
    pub fn search_by_name(&self, query: &str) -> Vec<&GuestConfirmation> {
        let needle = query.trim().to_lowercase();
        self.iter()
            .filter(|r| r.full_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Exact match on the trimmed contact key.
    pub fn find_by_contact_key(&self, key: &str) -> Option<&GuestConfirmation> {
        let key = key.trim();
        self.iter().find(|r| r.contact_key == key)
    }
}
