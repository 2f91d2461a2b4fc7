//! End-to-end API tests against JSON documents in a temporary directory.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use vyra::config::{ALERTS_FILE_NAME, CONTACTS_FILE_NAME};
use vyra::http::{router, AppState};
use vyra::{server, Config};

fn create_test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = Some(dir.path().to_path_buf());
    config
}

async fn send(state: &AppState, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();

    let resp = router(state.clone()).oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_contacts_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);

    let state = server::build_state(&config).unwrap();
    let (status, _) = send(
        &state,
        Method::POST,
        "/api/contacts",
        r#"{"name": "joão", "phone": "+55 11 9999-8888"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let restarted = server::build_state(&config).unwrap();
    let (_, body) = send(&restarted, Method::GET, "/api/contacts", "").await;
    assert_eq!(
        body,
        json!({"contacts": [{"name": "JOÃO", "phone": "+551199998888"}]})
    );
}

#[tokio::test]
async fn test_documents_are_readable_json() {
    let dir = TempDir::new().unwrap();
    let state = server::build_state(&create_test_config(&dir)).unwrap();

    send(
        &state,
        Method::POST,
        "/api/contacts",
        r#"{"name": "joão", "phone": "1"}"#,
    )
    .await;
    send(
        &state,
        Method::POST,
        "/api/alert",
        r#"{"occurrence": "Emergência médica", "driver_name": "Zé"}"#,
    )
    .await;

    let contacts = std::fs::read_to_string(dir.path().join(CONTACTS_FILE_NAME)).unwrap();
    assert!(contacts.contains("JOÃO"));
    assert!(contacts.contains('\n'));

    let alerts = std::fs::read_to_string(dir.path().join(ALERTS_FILE_NAME)).unwrap();
    assert!(alerts.contains("Emergência médica"));

    let parsed: Value = serde_json::from_str(&alerts).unwrap();
    assert_eq!(parsed[0]["status"], "open");
    assert_eq!(parsed[0]["driver_name"], "Zé");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_corrupt_documents_read_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONTACTS_FILE_NAME), "{ not json").unwrap();
    std::fs::write(dir.path().join(ALERTS_FILE_NAME), "").unwrap();

    let state = server::build_state(&create_test_config(&dir)).unwrap();
    let (status, body) = send(&state, Method::GET, "/api/contacts", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"contacts": []}));

    let (_, body) = send(&state, Method::GET, "/api/alerts", "").await;
    assert_eq!(body, json!({"alerts": []}));

    let (status, body) = send(
        &state,
        Method::POST,
        "/api/contacts",
        r#"{"name": "ana", "phone": "1"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["contacts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_alert_history_is_bounded() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.storage.max_alerts = 5;
    let state = server::build_state(&config).unwrap();

    for i in 1..=7 {
        let body = format!(r#"{{"driver_name": "driver {i}"}}"#);
        let (status, _) = send(&state, Method::POST, "/api/alert", &body).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&state, Method::GET, "/api/alerts", "").await;
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 5);
    assert_eq!(alerts[0]["driver_name"], "driver 3");
    assert_eq!(alerts[4]["driver_name"], "driver 7");

    let ids: Vec<i64> = alerts.iter().map(|a| a["id"].as_i64().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_alert_lifecycle() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let state = server::build_state(&config).unwrap();

    let (_, body) = send(
        &state,
        Method::POST,
        "/api/alert",
        r#"{"occurrence": "Passageiro agressivo", "driver_name": "Rita", "lat": "-22.9", "lng": -43.2, "accuracy": 12}"#,
    )
    .await;
    let id = body["alert"]["id"].as_i64().unwrap();

    let (_, body) = send(
        &state,
        Method::POST,
        "/api/alert/ack",
        &format!(r#"{{"id": {id}}}"#),
    )
    .await;
    assert_eq!(body, json!({"ok": true, "id": id, "status": "ack"}));

    let (_, body) = send(
        &state,
        Method::POST,
        "/api/alert/ack",
        &format!(r#"{{"id": "{id}", "status": "closed"}}"#),
    )
    .await;
    assert_eq!(body["ok"], true);

    let restarted = server::build_state(&config).unwrap();
    let (_, body) = send(&restarted, Method::GET, "/api/alerts", "").await;
    let alert = &body["alerts"][0];
    assert_eq!(alert["status"], "closed");
    assert_eq!(alert["lat"], -22.9);
    assert_eq!(alert["accuracy"], 12.0);
    assert!(alert["ack_ts"].is_string());

    let (status, body) = send(&restarted, Method::DELETE, "/api/alerts", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
    assert_eq!(
        std::fs::read_to_string(dir.path().join(ALERTS_FILE_NAME))
            .unwrap()
            .trim(),
        "[]"
    );
}

#[tokio::test]
async fn test_contact_limit_follows_config() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir);
    config.storage.max_contacts = 1;
    let state = server::build_state(&config).unwrap();

    send(
        &state,
        Method::POST,
        "/api/contacts",
        r#"{"name": "ana", "phone": "1"}"#,
    )
    .await;
    let (status, body) = send(
        &state,
        Method::POST,
        "/api/contacts",
        r#"{"name": "bia", "phone": "2"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"ok": false, "error": "Limite de 1 pessoas de confiança atingido."})
    );
}

#[tokio::test]
async fn test_unreadable_alert_does_not_erase_history() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(ALERTS_FILE_NAME),
        r#"[
  {"id": 1, "ts": "2026-10-18T10:56:00-03:00", "status": "open",
   "occurrence": "Outro", "driver_name": "Ana", "lat": null, "lng": null, "accuracy": null},
  {"id": 2, "ts": "2026-10-18T10:57:00-03:00", "status": "ack",
   "occurrence": "Emergência médica", "driver_name": "Bia", "lat": "-23.5", "lng": "-46.6",
   "accuracy": "", "ack_ts": "2026-10-18T10:58:00-03:00"},
  {"id": 3, "status": "open", "driver_name": "no timestamp"}
]"#,
    )
    .unwrap();
    let state = server::build_state(&create_test_config(&dir)).unwrap();

    let (status, body) = send(&state, Method::GET, "/api/alerts", "").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0]["driver_name"], "Ana");
    assert_eq!(alerts[1]["driver_name"], "Bia");
    assert_eq!(alerts[1]["lat"], -23.5);
    assert_eq!(alerts[1]["accuracy"], Value::Null);

    let (status, _) = send(
        &state,
        Method::POST,
        "/api/alert",
        r#"{"driver_name": "Caio"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(ALERTS_FILE_NAME)).unwrap())
            .unwrap();
    let drivers: Vec<&str> = stored
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["driver_name"].as_str().unwrap())
        .collect();
    assert_eq!(drivers, vec!["Ana", "Bia", "Caio"]);
}
