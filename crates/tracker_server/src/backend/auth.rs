//! Google API credentials: a fixed bearer token or a service account.
//!
//! Service accounts sign an RS256 assertion and exchange it at the token
//! endpoint (JWT bearer grant). Minted tokens are cached until shortly
//! before they expire.

use crate::backend::google::google_error_message;
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use jsonwebtoken::{get_current_timestamp, Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tokio::sync::Mutex;

/// Scopes requested for service-account tokens.
pub const GOOGLE_SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.file";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Cached tokens this close to expiry are minted again.
const REFRESH_MARGIN_SECS: u64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: u64,
}

/// Describe a failed token exchange (`error_description`, then `error`).
pub fn token_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error_description", "error"] {
            if let Some(message) = value
                .get(key)
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
            {
                return message.to_string();
            }
        }
    }
    google_error_message(status, body)
}

pub struct ServiceAccount {
    email: String,
    key: EncodingKey,
    token_uri: String,
    cache: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("email", &self.email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccount {
    /// # Errors
    /// Returns [`ProxyError::Backend`] when `private_key` is not an RSA PEM key.
    pub fn new(email: &str, private_key: &str, token_uri: &str) -> Result<Self, ProxyError> {
        let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|err| {
            ProxyError::Backend(format!("Invalid service account private key: {}", err))
        })?;
        Ok(Self {
            email: email.to_string(),
            key,
            token_uri: token_uri.to_string(),
            cache: Mutex::new(None),
        })
    }

    /// Signed JWT asserting this account, issued at `now`.
    pub fn assertion(&self, now: u64) -> Result<String, ProxyError> {
        let claims = AssertionClaims {
            iss: self.email.clone(),
            scope: GOOGLE_SCOPES.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|err| ProxyError::Backend(format!("Failed to sign token request: {}", err)))
    }

    /// Cached access token, minting a new one when missing or about to expire.
    ///
    /// The cache lock is held across the exchange so concurrent requests
    /// share one mint.
    pub async fn access_token(&self, client: &reqwest::Client) -> Result<String, ProxyError> {
        let mut cache = self.cache.lock().await;
        let now = get_current_timestamp();
        if let Some(token) = cache
            .as_ref()
            .filter(|token| token.expires_at > now + REFRESH_MARGIN_SECS)
        {
            return Ok(token.value.clone());
        }

        let minted = self.mint(client, now).await?;
        let value = minted.value.clone();
        *cache = Some(minted);
        Ok(value)
    }

    async fn mint(&self, client: &reqwest::Client, now: u64) -> Result<CachedToken, ProxyError> {
        let assertion = self.assertion(now)?;
        let res = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message: token_error_message(status, &body),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|err| ProxyError::Backend(format!("Invalid token response: {}", err)))?;
        tracing::debug!(account = %self.email, "Minted Google access token");
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS),
        })
    }
}

/// How requests to the Google APIs are authorized.
#[derive(Debug)]
pub enum GoogleCredentials {
    Token(String),
    ServiceAccount(ServiceAccount),
}

impl GoogleCredentials {
    /// Credentials named by `config`, or `None` when neither a token nor a
    /// complete service account (email and key) is configured.
    ///
    /// A fixed access token takes precedence.
    ///
    /// # Errors
    /// Returns an error when the service account key cannot be parsed.
    pub fn from_config(config: &ProxyConfig) -> Result<Option<Self>, ProxyError> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        if let Some(token) = present(&config.access_token) {
            return Ok(Some(GoogleCredentials::Token(token)));
        }
        match (
            present(&config.service_account_email),
            present(&config.private_key),
        ) {
            (Some(email), Some(key)) => Ok(Some(GoogleCredentials::ServiceAccount(
                ServiceAccount::new(&email, &key, &config.token_uri)?,
            ))),
            _ => Ok(None),
        }
    }

    pub async fn access_token(&self, client: &reqwest::Client) -> Result<String, ProxyError> {
        match self {
            GoogleCredentials::Token(token) => Ok(token.clone()),
            GoogleCredentials::ServiceAccount(account) => account.access_token(client).await,
        }
    }
}
