//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use tracker_server::{create_app, AppState, ProxyConfig, SheetsBackend};

pub(crate) fn memory_server() -> (TestServer, AppState) {
    let config = ProxyConfig {
        port: 0,
        ..ProxyConfig::memory()
    };
    let state = AppState::new(config).expect("state");
    let server = TestServer::new(create_app(state.clone())).expect("server");
    (server, state)
}

pub(crate) fn google_server_without_token() -> TestServer {
    let config = ProxyConfig {
        port: 0,
        access_token: None,
        ..ProxyConfig::default()
    };
    let state = AppState::new(config).expect("state");
    assert!(matches!(*state.backend, SheetsBackend::Google(_)));
    TestServer::new(create_app(state)).expect("server")
}

pub(crate) fn creative_row(id: &str, headline: &str) -> Vec<String> {
    [
        id,
        "P3",
        "TOFU",
        headline,
        "Trabaja desde el pueblo",
        "Más info",
        "N/A",
        "Custom",
        "✅ Creado",
        "2026-02-03T10:15:00Z",
        "",
    ]
    .iter()
    .map(|cell| cell.to_string())
    .collect()
}
