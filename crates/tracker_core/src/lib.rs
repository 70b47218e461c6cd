//! Core domain library for the creative tracker (config, storage, view model, sync).

/// Static creative catalog and the catalog/custom merger.
pub mod catalog;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants (storage keys, fallback literals, sheet layout).
pub mod constants;
/// Application error types (storage/domain).
pub mod error;
/// Data models for persistence and the proxy wire format.
pub mod models;
/// Edit overlay resolution and creative briefs.
pub mod overlay;
/// Durable local key-value store.
pub mod store;
/// Client side of the spreadsheet proxy protocol.
pub mod sync;
/// Orchestrator holding view state and driving user actions.
pub mod tracker;
/// Search/visibility filtering and completion statistics.
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::Catalog;
pub use config::Config;
pub use constants::DEFAULT_API_URL;
pub use error::AppError;
pub use store::LocalStore;
pub use sync::{HttpProxy, SheetsProxy, SyncError, SyncGateway};
pub use tracker::Tracker;
