//! Interface tests for confirmation stores and the RSVP workflow using Cucumber.
//!
//! These tests verify that every store backend honours the same contract and
//! that the workflow behaves identically on top of each of them.
//! Select a backend via environment variable:
//!
//! ```bash
//! # In-memory (default)
//! cargo test --test interfaces --features test-utils
//!
//! # SQLite
//! STORAGE_BACKEND=sqlite cargo test --test interfaces --features test-utils,sqlite
//!
//! # JSON file in a temp directory
//! STORAGE_BACKEND=file cargo test --test interfaces --features test-utils
//! ```

mod backend;
mod steps;

use cucumber::World;
use steps::confirmation_store::ConfirmationStoreWorld;
use steps::rsvp_workflow::RsvpWorkflowWorld;

#[tokio::main]
async fn main() {
    // Run ConfirmationStore tests
    println!("\n=== Running ConfirmationStore Interface Tests ===\n");
    ConfirmationStoreWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/confirmation_store.feature")
        .await;

    // Run RsvpWorkflow tests
    println!("\n=== Running RsvpWorkflow Interface Tests ===\n");
    RsvpWorkflowWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/rsvp_workflow.feature")
        .await;
}
