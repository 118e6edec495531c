//! rsvp - guest confirmation workflow for a wedding invitation site.
//!
//! A guest submits name, contact key and menu choice once. The workflow
//! rejects a second confirmation under the same contact key, persists the
//! record through a pluggable [`storage::ConfirmationStore`] and keeps an
//! in-memory list in sync for display and spreadsheet export.

pub mod config;
pub mod http;
pub mod model;
pub mod presentation;
pub mod spreadsheet;
pub mod storage;
pub mod utils;
pub mod validation;
pub mod workflow;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
