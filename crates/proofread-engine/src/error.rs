use shared_types::DateContextError;
use thiserror::Error;

/// Failures talking to the model endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Invalid API key")]
    Auth,

    #[error("Rate limited by provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Transport(err.to_string())
    }
}

/// Failures of a proofreading run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofreadError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Proofreading run was cancelled")]
    Cancelled,

    #[error("Invalid API key")]
    Auth,

    #[error("Rate limited by provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl From<ModelError> for ProofreadError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Transport(msg) => ProofreadError::Network(msg),
            ModelError::Auth => ProofreadError::Auth,
            ModelError::RateLimited { retry_after_secs } => {
                ProofreadError::RateLimited { retry_after_secs }
            }
            ModelError::Api { status, message } => ProofreadError::Api { status, message },
            ModelError::MalformedResponse(msg) => ProofreadError::MalformedResponse(msg),
        }
    }
}

impl From<DateContextError> for ProofreadError {
    fn from(err: DateContextError) -> Self {
        ProofreadError::Input(err.to_string())
    }
}

impl ProofreadError {
    /// Input problems are the caller's to fix; everything else may succeed later
    pub fn is_input(&self) -> bool {
        matches!(self, ProofreadError::Input(_))
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ProofreadError::Input(_) => "INVALID_INPUT",
            ProofreadError::Network(_) => "NETWORK_ERROR",
            ProofreadError::Timeout { .. } => "TIMEOUT",
            ProofreadError::Cancelled => "CANCELLED",
            ProofreadError::Auth => "AUTH_ERROR",
            ProofreadError::RateLimited { .. } => "RATE_LIMITED",
            ProofreadError::Api { .. } => "API_ERROR",
            ProofreadError::MalformedResponse(_) => "MALFORMED_RESPONSE",
        }
    }
}
