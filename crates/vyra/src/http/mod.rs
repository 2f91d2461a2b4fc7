//! HTTP API.
//!
//! Routes:
//!
//! | Method   | Path                | Handler                          |
//! |----------|---------------------|----------------------------------|
//! | `GET`    | `/health`           | [`handlers::health`]             |
//! | `GET`    | `/api/contacts`     | [`handlers::list_contacts`]      |
//! | `POST`   | `/api/contacts`     | [`handlers::add_contact`]        |
//! | `DELETE` | `/api/contacts`     | [`handlers::clear_contacts`]     |
//! | `GET`    | `/api/alerts`       | [`handlers::list_alerts`]        |
//! | `DELETE` | `/api/alerts`       | [`handlers::clear_alerts`]       |
//! | `POST`   | `/api/alert`        | [`handlers::create_alert`]       |
//! | `POST`   | `/api/alert/ack`    | [`handlers::acknowledge_alert`]  |
//! | `GET`    | `/api/occurrences`  | [`handlers::list_occurrences`]   |
//!
//! Errors are returned as `{"ok": false, "error": "..."}`.

mod error;
pub mod handlers;
mod payload;

pub use error::ApiError;
pub use payload::Payload;

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tracing::{info, info_span, Instrument};

use crate::alert::AlertLog;
use crate::contact::ContactBook;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Trusted contacts.
    pub contacts: ContactBook,
    /// Alert history.
    pub alerts: AlertLog,
}

impl AppState {
    /// Bundle the two services.
    #[must_use]
    pub fn new(contacts: ContactBook, alerts: AlertLog) -> Self {
        Self { contacts, alerts }
    }
}

/// Build the API router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/contacts",
            get(handlers::list_contacts)
                .post(handlers::add_contact)
                .delete(handlers::clear_contacts),
        )
        .route(
            "/api/alerts",
            get(handlers::list_alerts).delete(handlers::clear_alerts),
        )
        .route("/api/alert", post(handlers::create_alert))
        .route("/api/alert/ack", post(handlers::acknowledge_alert))
        .route("/api/occurrences", get(handlers::list_occurrences))
        .layer(middleware::from_fn(trace_requests))
        .with_state(state)
}

async fn trace_requests(request: Request, next: Next) -> Response {
    let span = info_span!(
        "http.request",
        method = %request.method(),
        path = %request.uri().path(),
    );
    let started = Instant::now();

    let response = next.run(request).instrument(span.clone()).await;

    info!(
        parent: &span,
        status = response.status().as_u16(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request completed"
    );
    response
}
