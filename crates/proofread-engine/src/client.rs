//! Model collaborator
//!
//! `ModelClient` is the seam the orchestrator talks through; tests substitute
//! a stub, production uses `HttpModelClient` over reqwest.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{ModelConfig, WireFormat};
use crate::error::ModelError;

/// One completion request. Credentials travel with the request, never in
/// client state.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt_text: String,
    pub api_key: String,
    pub model_id: String,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Return the model's text output for `request`
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError>;
}

/// Provider error message from a failure body.
///
/// The Messages API nests it as `error.message`; the relay flattens it to a
/// string `error`.
pub fn provider_error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

/// `content[0].text` from a Messages API success body
pub fn completion_text(body: &Value) -> Option<&str> {
    body.get("content")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
}

pub struct HttpModelClient {
    http: Client,
    config: ModelConfig,
}

impl HttpModelClient {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn request_body(&self, request: &ModelRequest) -> Value {
        match self.config.wire {
            WireFormat::Anthropic => messages_body(
                &request.model_id,
                self.config.max_tokens,
                &request.prompt_text,
            ),
            WireFormat::Relay => json!({
                "text": request.prompt_text,
                "apiKey": request.api_key,
                "model": request.model_id,
            }),
        }
    }

    /// POST a Messages API body to the configured endpoint and hand back the
    /// raw status and JSON body. Non-JSON bodies come back as a string value.
    pub async fn forward(&self, api_key: &str, body: &Value) -> Result<(u16, Value), ModelError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok((status, value))
    }
}

/// Messages API body for a single user turn
pub fn messages_body(model_id: &str, max_tokens: u32, prompt_text: &str) -> Value {
    json!({
        "model": model_id,
        "max_tokens": max_tokens,
        "messages": [{
            "role": "user",
            "content": prompt_text,
        }],
    })
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let body = self.request_body(request);

        let mut builder = self.http.post(&self.config.endpoint).json(&body);
        if self.config.wire == WireFormat::Anthropic {
            builder = builder
                .header("x-api-key", &request.api_key)
                .header("anthropic-version", &self.config.api_version);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Model endpoint responded");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ModelError::Auth);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse().ok());
            return Err(ModelError::RateLimited { retry_after_secs });
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .as_ref()
                .and_then(provider_error_message)
                .unwrap_or(text);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ModelError::MalformedResponse(format!("body is not JSON: {}", e)))?;
        completion_text(&value)
            .map(str::to_string)
            .ok_or_else(|| ModelError::MalformedResponse("missing content[0].text".to_string()))
    }
}
