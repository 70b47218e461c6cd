//! Client side of the spreadsheet proxy protocol.
//!
//! Remote writes are best-effort: callers commit local state first and turn
//! a [`SyncError`] into a warning. Nothing here retries or queues.

/// reqwest transport.
pub mod http;
/// Mirrored row layout.
pub mod row;

use crate::models::{Project, ProxyRequest, ProxyResponse};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;

pub use http::HttpProxy;
pub use row::SyncRow;

/// Errors raised while talking to the proxy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Proyecto no configurado: {0}")]
    NotConfigured(String),

    #[error("Creative '{0}' not found")]
    UnknownCreative(String),

    #[error("Local storage error: {0}")]
    Local(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid proxy response: {0}")]
    Decode(String),
}

/// Transport carrying one proxy request to the remote endpoint.
pub trait SheetsProxy {
    fn send(
        &self,
        request: ProxyRequest,
    ) -> impl Future<Output = Result<ProxyResponse, SyncError>> + Send;
}

/// Acknowledgement of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAck {
    pub message: Option<String>,
    /// Row overwritten in place; `None` when the row was appended.
    pub row_number: Option<usize>,
}

/// Spreadsheet created for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSheet {
    pub spreadsheet_id: String,
    pub url: Option<String>,
}

/// Typed operations over a [`SheetsProxy`].
#[derive(Debug, Clone)]
pub struct SyncGateway<P> {
    proxy: P,
}

fn require_configured(project: &Project) -> Result<(), SyncError> {
    if project.is_configured() {
        Ok(())
    } else {
        Err(SyncError::NotConfigured(format!(
            "project '{}' has no spreadsheet id",
            project.id
        )))
    }
}

impl<P: SheetsProxy> SyncGateway<P> {
    pub fn new(proxy: P) -> Self {
        Self { proxy }
    }

    pub fn proxy(&self) -> &P {
        &self.proxy
    }

    /// Upsert `row` keyed by `creative_id` into the project's sheet.
    ///
    /// # Errors
    /// Returns [`SyncError::NotConfigured`] for a project without a sheet id,
    /// otherwise whatever the transport or proxy reports.
    pub async fn push(
        &self,
        project: &Project,
        creative_id: &str,
        row: SyncRow,
    ) -> Result<RemoteAck, SyncError> {
        require_configured(project)?;
        tracing::info!(creative_id, project = %project.id, "Syncing creative to sheet");
        let request =
            ProxyRequest::update(&project.sheet_id, &project.sheet_name, creative_id, row.into_vec());
        let response = self.proxy.send(request).await?;
        Ok(RemoteAck {
            message: response.message,
            row_number: response.row_number,
        })
    }

    /// Create a spreadsheet titled `title` with one sheet named `sheet_name`.
    pub async fn create_sheet(&self, title: &str, sheet_name: &str) -> Result<CreatedSheet, SyncError> {
        let response = self
            .proxy
            .send(ProxyRequest::create_sheet(title, sheet_name))
            .await?;
        let spreadsheet_id = response
            .spreadsheet_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SyncError::Decode("create_sheet response without spreadsheetId".to_string()))?;
        Ok(CreatedSheet {
            spreadsheet_id,
            url: response.url,
        })
    }

    /// Grant write access to every address; one aggregate outcome.
    pub async fn share(&self, spreadsheet_id: &str, emails: &[String]) -> Result<Option<String>, SyncError> {
        let response = self
            .proxy
            .send(ProxyRequest::share(spreadsheet_id, emails))
            .await?;
        Ok(response.message)
    }

    /// Read the project's rows (`<sheet>!A:K` unless `range` is given).
    pub async fn read_rows(
        &self,
        project: &Project,
        range: Option<&str>,
    ) -> Result<Vec<Vec<String>>, SyncError> {
        require_configured(project)?;
        let response = self
            .proxy
            .send(ProxyRequest::read(&project.sheet_id, &project.sheet_name, range))
            .await?;
        match response.data {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(data) => serde_json::from_value(data).map_err(|err| SyncError::Decode(err.to_string())),
        }
    }
}
