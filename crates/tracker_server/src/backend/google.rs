//! Google Sheets v4 / Drive v3 REST client.

use crate::backend::auth::GoogleCredentials;
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub struct GoogleSheets {
    client: reqwest::Client,
    credentials: Option<Arc<GoogleCredentials>>,
    sheets_base: String,
    drive_base: String,
}

/// Pull `error.message` out of a Google API error body.
pub fn google_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
        {
            return message.to_string();
        }
    }
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }
    body.to_string()
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ProxyError> {
    let mut url = Url::parse(base)
        .map_err(|err| ProxyError::Backend(format!("Invalid API base '{}': {}", base, err)))?;
    url.path_segments_mut()
        .map_err(|_| ProxyError::Backend(format!("API base '{}' cannot take a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

async fn execute(request: RequestBuilder, token: &str) -> Result<Value, ProxyError> {
    let res = request.bearer_auth(token).send().await?;
    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        return Err(ProxyError::Upstream {
            status: status.as_u16(),
            message: google_error_message(status, &body),
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|err| ProxyError::Backend(format!("Invalid upstream response: {}", err)))
}

impl GoogleSheets {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built or the service
    /// account key is malformed.
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            credentials: GoogleCredentials::from_config(config)?.map(Arc::new),
            sheets_base: config.sheets_api_base.clone(),
            drive_base: config.drive_api_base.clone(),
        })
    }

    /// Configured credentials, or [`ProxyError::MissingCredentials`].
    pub fn ensure_credentials(&self) -> Result<&GoogleCredentials, ProxyError> {
        self.credentials
            .as_deref()
            .ok_or(ProxyError::MissingCredentials)
    }

    async fn bearer(&self) -> Result<String, ProxyError> {
        self.ensure_credentials()?
            .access_token(&self.client)
            .await
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url, ProxyError> {
        let last = format!("{}{}", range, suffix);
        endpoint(
            &self.sheets_base,
            &["spreadsheets", spreadsheet_id, "values", last.as_str()],
        )
    }

    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, ProxyError> {
        let token = self.bearer().await?;
        let url = self.values_url(spreadsheet_id, range, "")?;
        let body = execute(self.client.get(url), &token).await?;
        let rows = body
            .get("values")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| cells.iter().map(cell_text).collect())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }

    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<Value, ProxyError> {
        let token = self.bearer().await?;
        let url = self.values_url(spreadsheet_id, range, ":append")?;
        let request = self
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": rows }));
        execute(request, &token).await
    }

    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<Value, ProxyError> {
        let token = self.bearer().await?;
        let url = self.values_url(spreadsheet_id, range, "")?;
        let request = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": rows }));
        execute(request, &token).await
    }

    pub async fn create_spreadsheet(&self, title: &str, sheet_name: &str) -> Result<String, ProxyError> {
        let token = self.bearer().await?;
        let url = endpoint(&self.sheets_base, &["spreadsheets"])?;
        let payload = json!({
            "properties": { "title": title },
            "sheets": [{ "properties": { "title": sheet_name } }],
        });
        let body = execute(self.client.post(url).json(&payload), &token).await?;
        body.get("spreadsheetId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProxyError::Backend("Create response without spreadsheetId".to_string()))
    }

    /// Grant writer access to every address concurrently.
    ///
    /// All grants run to completion; the first failure is returned.
    pub async fn share_with(&self, spreadsheet_id: &str, emails: &[String]) -> Result<(), ProxyError> {
        let token = self.bearer().await?;
        let mut url = endpoint(&self.drive_base, &["files", spreadsheet_id, "permissions"])?;
        url.query_pairs_mut()
            .append_pair("sendNotificationEmail", "true");

        let mut grants = JoinSet::new();
        for email in emails {
            let request = self.client.post(url.clone()).json(&json!({
                "type": "user",
                "role": "writer",
                "emailAddress": email,
            }));
            let token = token.clone();
            grants.spawn(async move { execute(request, &token).await });
        }

        let mut first_error = None;
        while let Some(joined) = grants.join_next().await {
            let outcome = joined
                .map_err(|err| ProxyError::Backend(format!("Share task failed: {}", err)))
                .and_then(|result| result);
            if let Err(err) = outcome {
                tracing::warn!("Permission grant on {} failed: {}", spreadsheet_id, err);
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
