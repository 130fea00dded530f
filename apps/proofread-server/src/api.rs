//! API handlers for the proofreading server
//!
//! Provides REST endpoints for:
//! - Text proofreading
//! - PDF proofreading
//! - Provider relay

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use proofread_engine::client::{messages_body, provider_error_message};
use proofread_engine::export::{summary_line, to_csv, to_plain_text};
use proofread_engine::ProofreadReport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{ErrorRecord, ProofreadContext};
use tracing::{info, warn};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "proofread-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Text proofreading request
#[derive(Deserialize)]
pub struct ProofreadRequest {
    /// Document text
    pub text: String,

    /// Caller's provider API key, used for this request only
    pub api_key: String,

    /// Overrides the configured model
    pub model_id: Option<String>,

    /// Year range and document metadata
    pub context: ProofreadContext,
}

/// PDF proofreading request
#[derive(Deserialize)]
pub struct PdfProofreadRequest {
    /// Base64-encoded PDF bytes
    pub pdf_base64: String,
    pub api_key: String,
    pub model_id: Option<String>,
    pub context: ProofreadContext,
}

/// Ready-to-download serializations
#[derive(Serialize)]
pub struct ExportPayload {
    pub plain_text: String,
    pub csv: String,
}

/// Proofreading response
#[derive(Serialize)]
pub struct ProofreadResponse {
    pub success: bool,
    /// Only automated checks are included
    pub partial: bool,
    pub notice: Option<String>,
    pub count: usize,
    /// "3 issues found"
    pub summary: String,
    pub errors: Vec<ErrorRecord>,
    pub export: ExportPayload,
    /// Page-marked text pulled from an uploaded PDF
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

fn build_response(
    report: ProofreadReport,
    extracted_text: Option<String>,
) -> Result<ProofreadResponse, ServerError> {
    let csv = to_csv(&report.errors).map_err(|e| ServerError::Internal(e.to_string()))?;
    let count = report.errors.len();

    Ok(ProofreadResponse {
        success: true,
        partial: report.partial,
        notice: report.notice,
        count,
        summary: summary_line(count),
        export: ExportPayload {
            plain_text: to_plain_text(&report.errors),
            csv,
        },
        errors: report.errors,
        extracted_text,
    })
}

/// Handler: POST /api/proofread
pub async fn handle_proofread(
    State(state): State<AppState>,
    Json(req): Json<ProofreadRequest>,
) -> Result<Json<ProofreadResponse>, ServerError> {
    info!(
        "Proofread request: {} chars, type={}, years={}",
        req.text.len(),
        req.context.metadata.document_type,
        req.context.years
    );

    let report = state
        .proofreader
        .run(&req.text, &req.context, &req.api_key, req.model_id.as_deref())
        .await?;

    Ok(Json(build_response(report, None)?))
}

/// Handler: POST /api/proofread/pdf
pub async fn handle_proofread_pdf(
    State(state): State<AppState>,
    Json(req): Json<PdfProofreadRequest>,
) -> Result<Json<ProofreadResponse>, ServerError> {
    let bytes = STANDARD
        .decode(req.pdf_base64.trim())
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid base64 PDF data: {}", e)))?;

    info!("PDF proofread request: {} bytes", bytes.len());

    let extractor = state.extractor.clone();
    let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
        .await
        .map_err(|e| ServerError::Internal(format!("PDF extraction task failed: {}", e)))??;

    let report = state
        .proofreader
        .run(&text, &req.context, &req.api_key, req.model_id.as_deref())
        .await?;

    Ok(Json(build_response(report, Some(text))?))
}

/// Relay request, in the browser client's field names
#[derive(Deserialize)]
pub struct RelayRequest {
    /// Full prompt text
    pub text: String,
    #[serde(rename = "apiKey")]
    pub api_key: String,
    pub model: Option<String>,
}

/// Handler: POST /api/relay
///
/// Forwards the prompt to the Messages API. Provider success bodies pass
/// through untouched; provider failures keep their status with
/// `{error, details}`; local failures are 500 `{error, type: "function_error"}`.
pub async fn handle_relay(
    State(state): State<AppState>,
    Json(req): Json<RelayRequest>,
) -> Response {
    let model = state.relay.config();
    let body = messages_body(
        req.model.as_deref().unwrap_or(model.model_id.as_str()),
        model.max_tokens,
        &req.text,
    );

    let forwarded =
        tokio::time::timeout(model.timeout(), state.relay.forward(&req.api_key, &body)).await;

    match forwarded {
        Ok(Ok((status, data))) if (200..300).contains(&status) => {
            info!(status, "Relay request succeeded");
            (status_code(status), Json(data)).into_response()
        }
        Ok(Ok((status, data))) => {
            warn!(status, "Provider rejected relay request");
            let error = provider_error_message(&data).unwrap_or_else(|| "Claude API error".to_string());
            (
                status_code(status),
                Json(json!({ "error": error, "details": data })),
            )
                .into_response()
        }
        Ok(Err(e)) => function_error(e.to_string()),
        Err(_) => function_error(format!("Provider did not respond within {}ms", model.timeout_ms)),
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn function_error(message: String) -> Response {
    warn!(%message, "Relay request failed");
    let body: Value = json!({ "error": message, "type": "function_error" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
