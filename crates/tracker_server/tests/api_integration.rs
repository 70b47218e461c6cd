//! Integration tests for the sheets proxy HTTP API.

mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::{creative_row, google_server_without_token, memory_server};

const SHEET: &str = "Creative_Tracker";

#[tokio::test]
async fn test_options_preflight_returns_empty_ok_with_cors() {
    let (server, _state) = memory_server();

    let response = server
        .method(Method::OPTIONS, "/api/sheets")
        .add_header("origin", "https://tracker.example.com")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().is_empty());
    response.assert_header("access-control-allow-origin", "*");

    let preflight = server
        .method(Method::OPTIONS, "/api/sheets")
        .add_header("origin", "https://tracker.example.com")
        .add_header("access-control-request-method", "POST")
        .add_header("access-control-request-headers", "content-type")
        .await;
    assert_eq!(preflight.status_code(), StatusCode::OK);
    preflight.assert_header("access-control-allow-origin", "*");
    let methods = preflight
        .header("access-control-allow-methods")
        .to_str()
        .expect("methods")
        .to_string();
    for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
        assert!(methods.contains(method), "missing {} in {}", method, methods);
    }
}

#[tokio::test]
async fn test_cors_header_present_on_errors() {
    let (server, _state) = memory_server();
    let response = server
        .post("/api/sheets")
        .add_header("origin", "https://tracker.example.com")
        .json(&json!({ "action": "explode", "data": {} }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    response.assert_header("access-control-allow-origin", "*");
}

#[tokio::test]
async fn test_unknown_action_is_bad_request() {
    let (server, _state) = memory_server();
    let response = server
        .post("/api/sheets")
        .json(&json!({ "action": "delete_everything", "spreadsheetId": "s1", "data": {} }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": false, "error": "Acción no válida" }));
}

#[tokio::test]
async fn test_missing_credentials_fail_every_request() {
    let server = google_server_without_token();
    for action in ["append", "read", "nonsense"] {
        let response = server
            .post("/api/sheets")
            .json(&json!({
                "action": action,
                "spreadsheetId": "s1",
                "sheetName": SHEET,
                "data": { "rowData": ["x"] }
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Credenciales de Google no configuradas");
        assert!(body["details"].as_str().is_some());
    }
}

#[tokio::test]
async fn test_append_adds_row() {
    let (server, state) = memory_server();
    let response = server
        .post("/api/sheets")
        .json(&json!({
            "action": "append",
            "spreadsheetId": "s1",
            "sheetName": SHEET,
            "data": { "rowData": creative_row("P3-TOFU-001", "A") }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Fila añadida correctamente");
    assert!(body["data"].is_object());

    let memory = state.backend.as_memory().expect("memory backend");
    assert_eq!(memory.rows("s1", SHEET), vec![creative_row("P3-TOFU-001", "A")]);
}

#[tokio::test]
async fn test_update_upserts_by_creative_id() {
    let (server, state) = memory_server();
    let created: Value = server
        .post("/api/sheets")
        .json(&json!({
            "action": "create_sheet",
            "sheetName": SHEET,
            "data": { "title": "Alcoy - Creative Tracker" }
        }))
        .await
        .json();
    let spreadsheet_id = created["spreadsheetId"].as_str().expect("id").to_string();

    let first = server
        .post("/api/sheets")
        .json(&json!({
            "action": "update",
            "spreadsheetId": spreadsheet_id,
            "sheetName": SHEET,
            "data": { "creativeId": "P3-TOFU-001", "rowData": creative_row("P3-TOFU-001", "A") }
        }))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);
    let first: Value = first.json();
    assert_eq!(first["message"], "Fila creada (no existía previamente)");
    assert!(first.get("rowNumber").is_none());

    let second: Value = server
        .post("/api/sheets")
        .json(&json!({
            "action": "update",
            "spreadsheetId": spreadsheet_id,
            "sheetName": SHEET,
            "data": { "creativeId": "P3-TOFU-001", "rowData": creative_row("P3-TOFU-001", "B") }
        }))
        .await
        .json();
    assert_eq!(second["message"], "Fila actualizada correctamente");
    assert_eq!(second["rowNumber"], 2);

    let rows = state
        .backend
        .as_memory()
        .expect("memory backend")
        .rows(&spreadsheet_id, SHEET);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "ID");
    assert_eq!(rows[1], creative_row("P3-TOFU-001", "B"));
}

#[tokio::test]
async fn test_update_never_matches_header_row() {
    let (server, state) = memory_server();
    let memory = state.backend.as_memory().expect("memory backend");
    memory
        .append_values("s1", "Tab!A:K", vec![vec!["P3-TOFU-009".to_string()]])
        .expect("seed header-position row");

    let body: Value = server
        .post("/api/sheets")
        .json(&json!({
            "action": "update",
            "spreadsheetId": "s1",
            "sheetName": "Tab",
            "data": { "creativeId": "P3-TOFU-009", "rowData": creative_row("P3-TOFU-009", "A") }
        }))
        .await
        .json();
    assert_eq!(body["message"], "Fila creada (no existía previamente)");
    assert_eq!(memory.rows("s1", "Tab").len(), 2);
}

#[tokio::test]
async fn test_read_defaults_to_full_width_range() {
    let (server, _state) = memory_server();
    for id in ["P3-TOFU-001", "P3-TOFU-002"] {
        server
            .post("/api/sheets")
            .json(&json!({
                "action": "append",
                "spreadsheetId": "s1",
                "sheetName": SHEET,
                "data": { "rowData": creative_row(id, "A") }
            }))
            .await;
    }

    let body: Value = server
        .post("/api/sheets")
        .json(&json!({ "action": "read", "spreadsheetId": "s1", "sheetName": SHEET, "data": {} }))
        .await
        .json();
    assert_eq!(body["success"], true);
    let rows = body["data"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "P3-TOFU-002");

    let ids: Value = server
        .post("/api/sheets")
        .json(&json!({
            "action": "read",
            "spreadsheetId": "s1",
            "data": { "range": format!("{}!A2:A", SHEET) }
        }))
        .await
        .json();
    assert_eq!(ids["data"], json!([["P3-TOFU-002"]]));

    let empty: Value = server
        .post("/api/sheets")
        .json(&json!({ "action": "read", "spreadsheetId": "unknown", "sheetName": SHEET }))
        .await
        .json();
    assert_eq!(empty["data"], json!([]));
}

#[tokio::test]
async fn test_create_sheet_writes_header_and_returns_url() {
    let (server, state) = memory_server();
    let response = server
        .post("/api/sheets")
        .json(&json!({ "action": "create_sheet", "data": { "title": "Norte - Creative Tracker" } }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Google Sheet creado correctamente");
    let id = body["spreadsheetId"].as_str().expect("id");
    assert_eq!(
        body["url"],
        format!("https://docs.google.com/spreadsheets/d/{}/edit", id)
    );

    let memory = state.backend.as_memory().expect("memory backend");
    let rows = memory.rows(id, "Creative_Tracker");
    assert_eq!(
        rows,
        vec![tracker_core::constants::SHEET_HEADER
            .iter()
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>()]
    );
    assert_eq!(memory.title(id).as_deref(), Some("Norte - Creative Tracker"));
}

#[tokio::test]
async fn test_share_grants_every_address() {
    let (server, state) = memory_server();
    let created: Value = server
        .post("/api/sheets")
        .json(&json!({ "action": "create_sheet", "data": { "title": "Equipo" } }))
        .await
        .json();
    let id = created["spreadsheetId"].as_str().expect("id");

    let body: Value = server
        .post("/api/sheets")
        .json(&json!({
            "action": "share",
            "spreadsheetId": id,
            "data": { "emails": ["ana@example.com", "luis@example.com"] }
        }))
        .await
        .json();
    assert_eq!(body["message"], "Sheet compartido con 2 usuarios");
    assert_eq!(
        state.backend.as_memory().expect("memory backend").writers(id).len(),
        2
    );

    let failed = server
        .post("/api/sheets")
        .json(&json!({
            "action": "share",
            "spreadsheetId": id,
            "data": { "emails": ["not-an-email"] }
        }))
        .await;
    assert_eq!(failed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let failed: Value = failed.json();
    assert_eq!(failed["success"], false);
    assert!(failed["error"].as_str().expect("error").contains("not-an-email"));
}

#[tokio::test]
async fn test_malformed_bodies_are_server_errors() {
    let (server, _state) = memory_server();

    let missing_payload = server
        .post("/api/sheets")
        .json(&json!({ "action": "append", "spreadsheetId": "s1", "sheetName": SHEET, "data": {} }))
        .await;
    assert_eq!(missing_payload.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let missing_sheet = server
        .post("/api/sheets")
        .json(&json!({ "action": "append", "spreadsheetId": "s1", "data": { "rowData": [] } }))
        .await;
    assert_eq!(missing_sheet.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = missing_sheet.json();
    assert!(body["error"].as_str().expect("error").contains("sheetName"));

    let not_json = server
        .post("/api/sheets")
        .text("{not json")
        .content_type("application/json")
        .await;
    assert_eq!(not_json.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = not_json.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_oversized_column_in_read_range_is_server_error() {
    let (server, _state) = memory_server();
    let response = server
        .post("/api/sheets")
        .json(&json!({
            "action": "read",
            "spreadsheetId": "s1",
            "data": { "range": "S!ZZZZZZZZZZZZZZZZZZZZ:A" }
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().expect("error").contains("Invalid range"));
}

#[tokio::test]
async fn test_service_account_token_authorizes_google_calls() {
    use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};
    use tracker_server::{create_app, AppState, ProxyConfig};

    #[derive(Default)]
    struct Seen {
        token_requests: Mutex<usize>,
        authorization: Mutex<Vec<String>>,
    }

    async fn token(State(seen): State<Arc<Seen>>) -> Json<Value> {
        *seen.token_requests.lock().expect("seen") += 1;
        Json(json!({ "access_token": "ya29.service", "expires_in": 3600 }))
    }

    async fn values(State(seen): State<Arc<Seen>>, headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        seen.authorization.lock().expect("seen").push(auth);
        Json(json!({ "updates": { "updatedRange": "Creative_Tracker!A2:K2" } }))
    }

    let seen = Arc::new(Seen::default());
    let google = Router::new()
        .route("/token", post(token))
        .route("/v4/spreadsheets/:id/values/:range", post(values))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, google).await;
    });

    let config = ProxyConfig {
        port: 0,
        service_account_email: Some("tracker@creative-tracker.iam.gserviceaccount.com".to_string()),
        private_key: Some(include_str!("fixtures/service_account_key.pem").to_string()),
        token_uri: format!("http://{}/token", addr),
        sheets_api_base: format!("http://{}/v4", addr),
        ..ProxyConfig::default()
    };
    let state = AppState::new(config).expect("state");
    let server = axum_test::TestServer::new(create_app(state)).expect("server");

    for id in ["P3-TOFU-001", "P3-TOFU-002"] {
        let response = server
            .post("/api/sheets")
            .json(&json!({
                "action": "append",
                "spreadsheetId": "s1",
                "sheetName": SHEET,
                "data": { "rowData": creative_row(id, "A") }
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    assert_eq!(*seen.token_requests.lock().expect("seen"), 1);
    assert_eq!(
        *seen.authorization.lock().expect("seen"),
        vec!["Bearer ya29.service".to_string(); 2]
    );
}
