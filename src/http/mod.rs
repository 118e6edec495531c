//! REST API for the RSVP site.
//!
//! Endpoints:
//! - `GET /api/health` — health check
//! - `GET /api/rsvp` — current presenter view
//! - `POST /api/rsvp` — submit a confirmation
//! - `GET /api/rsvp/summary` — counts and per-option breakdown
//! - `GET /api/rsvp/export` — CSV download of every confirmation
//! - `POST /api/rsvp/mask` — contact input mask, for as-you-type filtering

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::model::GuestConfirmation;
use crate::presentation::{ExportError, PresenterView, RsvpPresenter, Statistics};
use crate::spreadsheet::CsvWriter;
use crate::validation::{FieldError, FormInput};
use crate::workflow::RsvpError;

/// Shared state for axum handlers.
type AppState = Arc<RsvpPresenter>;

/// Serve the API on `addr` until `shutdown` resolves.
///
/// A port of 0 lets the OS pick one; the bound address is always logged.
pub async fn serve<F>(
    presenter: Arc<RsvpPresenter>,
    addr: &str,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(presenter);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "RSVP API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(presenter: Arc<RsvpPresenter>) -> Router {
    // The static site is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/rsvp", get(current_view).post(submit))
        .route("/api/rsvp/summary", get(summary))
        .route("/api/rsvp/export", get(export))
        .route("/api/rsvp/mask", post(mask))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(presenter)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn current_view(State(presenter): State<AppState>) -> Json<PresenterView> {
    Json(presenter.view(Utc::now()).await)
}

async fn summary(State(presenter): State<AppState>) -> Json<Statistics> {
    Json(presenter.statistics())
}

/// Body of an accepted submission: the stored record plus the banner text
/// for the guest who sent it.
#[derive(Debug, Serialize)]
pub struct ConfirmedBody {
    #[serde(flatten)]
    pub confirmation: GuestConfirmation,
    pub message: String,
}

/// Error body for rejected submissions.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Every client submits independently; the banner text goes back in the
/// response rather than into the shared view.
async fn submit(
    State(presenter): State<AppState>,
    Json(form): Json<FormInput>,
) -> Result<(StatusCode, Json<ConfirmedBody>), (StatusCode, Json<ErrorBody>)> {
    match presenter.submit_detached(form).await {
        Ok(confirmation) => Ok((
            StatusCode::CREATED,
            Json(ConfirmedBody {
                confirmation,
                message: presenter.success_message().to_string(),
            }),
        )),
        Err(failed) => {
            let fields = failed.field_errors().to_vec();
            Err((
                status_for(&failed.error),
                Json(ErrorBody {
                    kind: failed.error.kind(),
                    message: failed.message,
                    fields,
                }),
            ))
        }
    }
}

fn status_for(err: &RsvpError) -> StatusCode {
    match err {
        RsvpError::Validation(_) => StatusCode::BAD_REQUEST,
        RsvpError::DuplicateContact { .. } => StatusCode::CONFLICT,
        RsvpError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn export(State(presenter): State<AppState>) -> Response {
    let today = Utc::now()
        .with_timezone(&presenter.event().offset())
        .date_naive();

    match presenter.render_export(&CsvWriter, today) {
        Ok(file) => {
            let disposition = format!("attachment; filename=\"{}\"", file.file_name);
            let disposition = match HeaderValue::from_str(&disposition) {
                Ok(value) => value,
                Err(e) => {
                    error!(error = %e, file_name = %file.file_name, "invalid export file name");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            (
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                file.bytes,
            )
                .into_response()
        }
        Err(ExportError::Empty) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!(error = %e, "failed to export confirmations");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MaskBody {
    pub value: String,
}

async fn mask(State(presenter): State<AppState>, Json(body): Json<MaskBody>) -> Json<MaskBody> {
    Json(MaskBody {
        value: presenter.mask_contact_input(&body.value),
    })
}
