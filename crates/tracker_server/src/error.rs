//! HTTP error mapping for the sheets endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracker_core::models::ProxyResponse;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Acción no válida")]
    UnknownAction(String),

    #[error("Credenciales de Google no configuradas")]
    MissingCredentials,

    #[error("Invalid request: {0}")]
    InvalidPayload(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Backend(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if let ProxyError::UnknownAction(ref action) = self {
            tracing::warn!("Rejected unknown action '{}'", action);
            let body = Json(ProxyResponse::failure(self.to_string()));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        tracing::error!("Sheets request failed: {:?}", self);
        let body = ProxyResponse {
            details: Some(format!("{:?}", self)),
            ..ProxyResponse::failure(self.to_string())
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
