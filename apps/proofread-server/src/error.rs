//! Error types for the proofreading server

use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use proofread_engine::ProofreadError;
use serde::Serialize;
use shared_pdf::PdfError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("PDF too large: {0}")]
    PdfTooLarge(String),

    #[error("Invalid API key")]
    Unauthorized,

    #[error("Rate limited by provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Model request timed out after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::PdfTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PDF_TOO_LARGE"),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "AUTH_ERROR"),
            ServerError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            ServerError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ServerError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match &self {
            ServerError::InvalidRequest(msg)
            | ServerError::PdfTooLarge(msg)
            | ServerError::Upstream(msg)
            | ServerError::Internal(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        match self {
            ServerError::RateLimited {
                retry_after_secs: Some(secs),
            } => (status, [(RETRY_AFTER, secs.to_string())], Json(body)).into_response(),
            _ => (status, Json(body)).into_response(),
        }
    }
}

impl From<ProofreadError> for ServerError {
    fn from(err: ProofreadError) -> Self {
        match err {
            ProofreadError::Input(msg) => ServerError::InvalidRequest(msg),
            ProofreadError::Auth => ServerError::Unauthorized,
            ProofreadError::RateLimited { retry_after_secs } => {
                ServerError::RateLimited { retry_after_secs }
            }
            ProofreadError::Timeout { ms } => ServerError::Timeout(ms),
            ProofreadError::Cancelled => ServerError::Internal(err.to_string()),
            ProofreadError::Network(_)
            | ProofreadError::Api { .. }
            | ProofreadError::MalformedResponse(_) => ServerError::Upstream(err.to_string()),
        }
    }
}

impl From<PdfError> for ServerError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::TooLarge { .. } => ServerError::PdfTooLarge(err.to_string()),
            other => ServerError::InvalidRequest(other.to_string()),
        }
    }
}
