//! Bootstrap utilities for the rsvp-server binary.

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the RSVP_LOG environment variable.
///
/// Defaults to "info" level if RSVP_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Open a backing store with exponential backoff.
///
/// Only used at startup: a store on a network volume may not be mounted yet.
/// Submissions themselves are never retried.
pub async fn open_with_retry<T, E, F, Fut>(
    backend: &str,
    max_attempts: u32,
    open: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    const INITIAL_DELAY: Duration = Duration::from_millis(100);
    const MAX_DELAY: Duration = Duration::from_secs(5);

    let mut delay = INITIAL_DELAY;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match open().await {
            Ok(store) => {
                tracing::info!(backend, attempt, "Storage opened");
                return Ok(store);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    backend,
                    attempt,
                    max_attempts,
                    error = %e,
                    retry_in = ?delay,
                    "Failed to open storage, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, MAX_DELAY);
            }
            Err(e) => {
                tracing::error!(backend, attempts = attempt, error = %e, "Giving up opening storage");
                return Err(e);
            }
        }
    }
}
