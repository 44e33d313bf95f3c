//! JSON HTTP API.
//!
//! Exposes report posting, match previews, and per-user listings for a
//! browser front end. Authentication is handled upstream; the owner id is
//! taken from the request as given.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/reports` | Post a report, returns `{ id, matches, notifications }` |
//! | `POST` | `/reports/preview` | Matches for a report without storing it |
//! | `GET`  | `/users/{owner}/reports` | The user's own reports |
//! | `GET`  | `/users/{owner}/notifications` | `{ unread, notifications }`, newest first |
//! | `GET`  | `/users/{owner}/notifications/stream` | Server-sent `unread` events carrying the live unread count |
//! | `POST` | `/notifications/{id}/read` | Mark a notification as read |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "itemType must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use lostfound_core::matcher::MatchParams;
use lostfound_core::models::{MatchResult, Notification};
use lostfound_core::store::ReportStore;

use crate::config::Config;
use crate::json_store::JsonStore;
use crate::notify::Notifier;
use crate::profile::{self, NotificationList, OwnedReport};
use crate::report::{self, NewReport, PostOutcome};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReportStore>,
    pub notifier: Notifier,
    pub params: Arc<MatchParams>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReportStore>, params: MatchParams) -> Self {
        Self {
            store,
            notifier: Notifier::new(),
            params: Arc::new(params),
        }
    }
}

/// Build the router. Split out from [`run_server`] so tests can drive it
/// without binding a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/reports", post(handle_post_report))
        .route("/reports/preview", post(handle_preview))
        .route("/users/{owner}/reports", get(handle_user_reports))
        .route("/users/{owner}/notifications", get(handle_user_notifications))
        .route(
            "/users/{owner}/notifications/stream",
            get(handle_notification_stream),
        )
        .route("/notifications/{id}/read", post(handle_mark_read))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind`, backed by the JSON store.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = JsonStore::open(&config.store.path)?;
    let state = AppState::new(Arc::new(store), config.matching.params());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Maps pipeline errors to HTTP statuses by message, so the library
/// functions can stay on plain `anyhow::Result`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let message = err.to_string();
        if message.contains("not found") {
            AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found",
                message,
            }
        } else if message.contains("must not be empty") {
            AppError {
                status: StatusCode::BAD_REQUEST,
                code: "bad_request",
                message,
            }
        } else {
            error!(error = %format!("{:#}", err), "request failed");
            AppError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "internal",
                message,
            }
        }
    }
}

/// Malformed or mistyped request bodies are reported like validation errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: rejection.body_text(),
        }
    }
}

// ============ Handlers ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn handle_post_report(
    State(state): State<AppState>,
    payload: Result<Json<NewReport>, JsonRejection>,
) -> Result<Json<PostOutcome>, AppError> {
    let Json(body) = payload?;
    let outcome = report::post_report(state.store.as_ref(), &state.notifier, &state.params, body).await?;
    Ok(Json(outcome))
}

#[derive(Serialize)]
struct PreviewResponse {
    matches: Vec<MatchResult>,
}

async fn handle_preview(
    State(state): State<AppState>,
    payload: Result<Json<NewReport>, JsonRejection>,
) -> Result<Json<PreviewResponse>, AppError> {
    let Json(body) = payload?;
    let matches = report::preview_matches(state.store.as_ref(), &state.params, body).await?;
    Ok(Json(PreviewResponse { matches }))
}

#[derive(Serialize)]
struct ReportsResponse {
    reports: Vec<OwnedReport>,
}

async fn handle_user_reports(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<ReportsResponse>, AppError> {
    let reports = profile::my_items(state.store.as_ref(), &owner).await?;
    Ok(Json(ReportsResponse { reports }))
}

async fn handle_user_notifications(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<NotificationList>, AppError> {
    let list = profile::my_notifications(state.store.as_ref(), &owner).await?;
    Ok(Json(list))
}

/// Streams the owner's unread count: the current value first, then one
/// event per change. The subscription is closed when the client goes away.
async fn handle_notification_stream(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let unread = state.store.unread_count(&owner).await?;
    let mut subscription = state.notifier.subscribe(&owner, unread);
    debug!(owner = %owner, unread, "notification stream opened");

    let stream = async_stream::stream! {
        yield Ok(unread_event(unread));
        while let Some(count) = subscription.changed().await {
            yield Ok(unread_event(count));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn unread_event(count: usize) -> Event {
    Event::default().event("unread").data(count.to_string())
}

async fn handle_mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    let notification = profile::mark_read(state.store.as_ref(), &state.notifier, &id).await?;
    Ok(Json(notification))
}
