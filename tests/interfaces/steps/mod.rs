//! Cucumber step definitions for interface tests.

pub mod confirmation_store;
pub mod rsvp_workflow;
