//! reqwest-backed transport for the spreadsheet proxy.

use super::{SheetsProxy, SyncError};
use crate::models::{ProxyRequest, ProxyResponse};
use serde_json::Value;
use std::time::Duration;

/// Build `<base>/<segments...>` from a proxy base URL.
pub fn api_url(base: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|err| format!("Invalid proxy URL '{}': {}", base, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| "Proxy URL cannot be used as an API base".to_string())?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

/// Extract a human-readable error from a failed proxy response body.
pub fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return value
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or(body)
            .to_string();
    }

    body.to_string()
}

/// Sends proxy requests as JSON `POST`s to `<api_url>/sheets`.
#[derive(Clone, Debug)]
pub struct HttpProxy {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl HttpProxy {
    /// Create a transport for the proxy rooted at `api_url`.
    ///
    /// # Errors
    /// Returns [`SyncError::NotConfigured`] for an unusable URL and
    /// [`SyncError::Transport`] when the HTTP client cannot be built.
    pub fn new(api_url_base: &str, timeout: Duration) -> Result<Self, SyncError> {
        let endpoint = api_url(api_url_base, &["sheets"]).map_err(SyncError::NotConfigured)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

impl SheetsProxy for HttpProxy {
    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, SyncError> {
        tracing::debug!(action = %request.action, endpoint = %self.endpoint, "proxy request");
        let res = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|err| SyncError::Transport(format!("failed to read response body: {}", err)))?;

        if !status.is_success() {
            return Err(SyncError::Remote {
                status: status.as_u16(),
                message: error_message_for_response(status, &body),
            });
        }

        let response: ProxyResponse =
            serde_json::from_str(&body).map_err(|err| SyncError::Decode(err.to_string()))?;
        if !response.success {
            return Err(SyncError::Remote {
                status: status.as_u16(),
                message: response
                    .error
                    .unwrap_or_else(|| "Error al sincronizar".to_string()),
            });
        }
        Ok(response)
    }
}
