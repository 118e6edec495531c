//! rsvp-server: RSVP API for the wedding invitation site
//!
//! Loads configuration, opens the confirmation store, builds the workflow
//! and serves the REST API until Ctrl-C.
//!
//! ## Architecture
//! ```text
//! [Static site] -> [REST API :8080] -> [RsvpPresenter] -> [RsvpWorkflow]
//!                                                              |
//!                                                              v
//!                                                 [SQLite / JSON file / memory]
//! ```
//!
//! ## Configuration
//! - `config.yaml` in the working directory, or a file named by the first
//!   argument or RSVP_CONFIG
//! - RSVP__SERVER__PORT, RSVP__STORAGE__TYPE, ... override file values
//! - RSVP_LOG: tracing filter (default: info)

use std::sync::Arc;

use tracing::{error, info};

use rsvp::config::Config;
use rsvp::http;
use rsvp::presentation::RsvpPresenter;
use rsvp::storage::init_storage;
use rsvp::utils::bootstrap::{init_tracing, open_with_retry};
use rsvp::workflow::RsvpWorkflow;

const STORAGE_OPEN_ATTEMPTS: u32 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;

    info!(
        storage = config.storage.storage_type.as_str(),
        addr = %config.server.bind_address(),
        deadline = %config.event.deadline,
        "starting rsvp-server"
    );

    let backend = config.storage.storage_type.as_str();
    let store = open_with_retry(backend, STORAGE_OPEN_ATTEMPTS, || init_storage(&config.storage))
        .await?;

    let workflow = Arc::new(RsvpWorkflow::from_config(store, &config.event)?);
    let presenter = Arc::new(RsvpPresenter::new(
        workflow,
        config.event.clone(),
        config.messages.clone(),
    ));
    presenter.init().await;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
        }
        info!("shutting down");
    };

    http::serve(presenter, &config.server.bind_address(), shutdown)
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    Ok(())
}
