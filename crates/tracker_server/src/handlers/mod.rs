//! HTTP request handlers.

/// Spreadsheet proxy endpoint.
pub mod sheets;
