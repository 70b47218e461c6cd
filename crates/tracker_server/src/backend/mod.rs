//! Spreadsheet backends behind the proxy endpoint.

/// Google API credentials and token minting.
pub mod auth;
/// Google Sheets / Drive REST client.
pub mod google;
/// In-memory spreadsheet store.
pub mod memory;
/// A1 range notation.
pub mod range;

pub use google::GoogleSheets;
pub use memory::MemorySheets;

use crate::config::{BackendKind, ProxyConfig};
use crate::error::ProxyError;
use serde_json::Value;

/// Spreadsheet implementation selected at startup.
#[derive(Debug)]
pub enum SheetsBackend {
    Google(GoogleSheets),
    Memory(MemorySheets),
}

impl SheetsBackend {
    /// Build the backend named by `config.backend`.
    ///
    /// # Errors
    /// Returns an error when the HTTP client for the Google backend cannot be built.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ProxyError> {
        Ok(match config.backend {
            BackendKind::Google => SheetsBackend::Google(GoogleSheets::new(config)?),
            BackendKind::Memory => SheetsBackend::Memory(MemorySheets::new()),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SheetsBackend::Google(_) => "google",
            SheetsBackend::Memory(_) => "memory",
        }
    }

    /// Fail fast when the backend cannot serve any request.
    pub fn ensure_ready(&self) -> Result<(), ProxyError> {
        match self {
            SheetsBackend::Google(google) => google.ensure_credentials().map(|_| ()),
            SheetsBackend::Memory(_) => Ok(()),
        }
    }

    pub fn as_memory(&self) -> Option<&MemorySheets> {
        match self {
            SheetsBackend::Memory(memory) => Some(memory),
            SheetsBackend::Google(_) => None,
        }
    }

    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, ProxyError> {
        match self {
            SheetsBackend::Google(google) => google.get_values(spreadsheet_id, range).await,
            SheetsBackend::Memory(memory) => memory.get_values(spreadsheet_id, range),
        }
    }

    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<Value, ProxyError> {
        match self {
            SheetsBackend::Google(google) => google.append_values(spreadsheet_id, range, rows).await,
            SheetsBackend::Memory(memory) => memory.append_values(spreadsheet_id, range, rows),
        }
    }

    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<Value, ProxyError> {
        match self {
            SheetsBackend::Google(google) => google.update_values(spreadsheet_id, range, rows).await,
            SheetsBackend::Memory(memory) => memory.update_values(spreadsheet_id, range, rows),
        }
    }

    pub async fn create_spreadsheet(&self, title: &str, sheet_name: &str) -> Result<String, ProxyError> {
        match self {
            SheetsBackend::Google(google) => google.create_spreadsheet(title, sheet_name).await,
            SheetsBackend::Memory(memory) => memory.create_spreadsheet(title, sheet_name),
        }
    }

    pub async fn share_with(&self, spreadsheet_id: &str, emails: &[String]) -> Result<(), ProxyError> {
        match self {
            SheetsBackend::Google(google) => google.share_with(spreadsheet_id, emails).await,
            SheetsBackend::Memory(memory) => memory.share_with(spreadsheet_id, emails),
        }
    }
}
