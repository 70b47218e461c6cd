//! HTTP proxy between tracker clients and the spreadsheet backend.

/// Spreadsheet backends (Google REST, in-memory).
pub mod backend;
/// Proxy configuration.
pub mod config;
/// HTTP error mapping for API handlers.
pub mod error;
/// HTTP handlers.
pub mod handlers;

pub use backend::SheetsBackend;
pub use config::{BackendKind, ProxyConfig};
pub use error::ProxyError;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::post,
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared state passed to HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<SheetsBackend>,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    /// Build state with the backend named by `config`.
    ///
    /// # Errors
    /// Returns an error when the backend cannot be constructed.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let backend = SheetsBackend::from_config(&config)?;
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: ProxyConfig, backend: SheetsBackend) -> Self {
        Self {
            backend: Arc::new(backend),
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware.
///
/// Every response carries permissive CORS headers.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/sheets",
            post(handlers::sheets::handle).options(handlers::sheets::preflight),
        )
        .with_state(state.clone())
        .layer(
            tower::ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(state.config.max_body_size))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Resolve the listener address from env var overrides and security policy.
///
/// Non-loopback `BIND` targets are only honored when `allow_public_access`
/// is set.
pub fn resolve_bind_address(config: &ProxyConfig, allow_public_access: bool) -> SocketAddr {
    let default_bind = SocketAddr::from(([127, 0, 0, 1], config.port));
    let requested = match std::env::var("BIND") {
        Ok(value) => match value.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::warn!(
                    "Invalid BIND='{}': {}. Falling back to {}",
                    value,
                    err,
                    default_bind
                );
                default_bind
            }
        },
        Err(_) => default_bind,
    };

    if allow_public_access || requested.ip().is_loopback() {
        return requested;
    }

    tracing::warn!(
        "Non-loopback bind {} requested without ALLOW_PUBLIC_ACCESS; forcing 127.0.0.1",
        requested
    );
    SocketAddr::from(([127, 0, 0, 1], requested.port()))
}

/// Run the Axum server with graceful shutdown support.
///
/// # Errors
/// Returns any I/O error produced by `axum::serve`.
pub async fn serve_router(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
