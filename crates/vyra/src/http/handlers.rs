//! Request handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use super::payload::Payload;
use super::AppState;
use crate::alert::{Alert, AlertRequest, AlertStatus, Occurrence};
use crate::contact::Contact;
use crate::APP_NAME;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `true`.
    pub ok: bool,
    /// Product name.
    pub app: &'static str,
}

/// Bare success acknowledgement.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    /// Always `true`.
    pub ok: bool,
}

/// The contact list.
#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    /// Contacts in registration order.
    pub contacts: Vec<Contact>,
}

/// The contact list after a registration.
#[derive(Debug, Serialize)]
pub struct ContactAddedResponse {
    /// Always `true`.
    pub ok: bool,
    /// The full list, including the new contact.
    pub contacts: Vec<Contact>,
}

/// The alert history, oldest first.
#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    /// Alerts, oldest first.
    pub alerts: Vec<Alert>,
}

/// A newly raised alert.
#[derive(Debug, Serialize)]
pub struct AlertCreatedResponse {
    /// Always `true`.
    pub ok: bool,
    /// The stored alert.
    pub alert: Alert,
}

/// Result of a status change. `id` is echoed exactly as it was sent.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    /// Whether an alert was updated.
    pub ok: bool,
    /// The requested id, as sent.
    pub id: Value,
    /// The status applied.
    pub status: AlertStatus,
}

/// The occurrence labels a driver can pick from.
#[derive(Debug, Serialize)]
pub struct OccurrencesResponse {
    /// Labels in display order.
    pub occurrences: Vec<&'static str>,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        app: APP_NAME,
    })
}

/// `GET /api/contacts`
pub async fn list_contacts(State(state): State<AppState>) -> Json<ContactsResponse> {
    Json(ContactsResponse {
        contacts: state.contacts.list().await,
    })
}

/// `POST /api/contacts` with `{name, phone}`.
pub async fn add_contact(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<ContactAddedResponse> {
    let payload = Payload::parse(&body);
    let name = payload.text("name").unwrap_or_default();
    let phone = payload.text("phone").unwrap_or_default();

    let contacts = state.contacts.add(&name, &phone).await?;
    Ok(Json(ContactAddedResponse { ok: true, contacts }))
}

/// `DELETE /api/contacts`
pub async fn clear_contacts(State(state): State<AppState>) -> ApiResult<OkResponse> {
    state.contacts.clear().await?;
    Ok(Json(OkResponse { ok: true }))
}

/// `GET /api/alerts`
pub async fn list_alerts(State(state): State<AppState>) -> Json<AlertsResponse> {
    Json(AlertsResponse {
        alerts: state.alerts.list().await,
    })
}

/// `DELETE /api/alerts`
pub async fn clear_alerts(State(state): State<AppState>) -> ApiResult<OkResponse> {
    state.alerts.clear().await?;
    Ok(Json(OkResponse { ok: true }))
}

/// `POST /api/alert` with `{occurrence, driver_name, lat, lng, accuracy}`.
pub async fn create_alert(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<AlertCreatedResponse> {
    let payload = Payload::parse(&body);
    let request = AlertRequest {
        // Only a missing key gets the default; a present `null` is unrecognized.
        occurrence: payload
            .contains("occurrence")
            .then(|| payload.text("occurrence").unwrap_or_default()),
        driver_name: payload.text("driver_name").unwrap_or_default(),
        lat: payload.number("lat"),
        lng: payload.number("lng"),
        accuracy: payload.number("accuracy"),
    };

    let alert = state.alerts.create(request).await?;
    Ok(Json(AlertCreatedResponse { ok: true, alert }))
}

/// `POST /api/alert/ack` with `{id, status}`.
///
/// An unknown id is not an error: the response carries `ok: false`.
pub async fn acknowledge_alert(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<AckResponse> {
    let payload = Payload::parse(&body);
    let status = payload
        .text("status")
        .map_or(AlertStatus::Ack, |s| AlertStatus::parse_or_ack(&s));

    let ok = match payload.id_text("id") {
        Some(id) => state.alerts.acknowledge(&id, status).await?,
        None => false,
    };

    Ok(Json(AckResponse {
        ok,
        id: payload.raw("id"),
        status,
    }))
}

/// `GET /api/occurrences`
pub async fn list_occurrences() -> Json<OccurrencesResponse> {
    Json(OccurrencesResponse {
        occurrences: Occurrence::labels(),
    })
}
