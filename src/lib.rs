//! Root crate facade for the creative tracker core library and sheets proxy.

pub use tracker_core::{
    catalog, config, constants, error, models, overlay, store, sync, tracker, view, AppError,
    Catalog, Config, HttpProxy, LocalStore, SheetsProxy, SyncError, SyncGateway, Tracker,
};

/// Spreadsheet proxy service.
pub mod proxy {
    pub use tracker_server::{
        create_app, resolve_bind_address, serve_router, AppState, BackendKind, ProxyConfig,
        ProxyError, SheetsBackend,
    };
}
