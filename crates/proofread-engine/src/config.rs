//! Proofreading configuration
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration. Loaded once at startup and shared read-only afterwards.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofreadConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub rules: RuleSettings,
    #[serde(default)]
    pub input: InputLimits,
    /// Keep rule-engine results when the model response body is malformed,
    /// marking the report as partial instead of failing the run
    #[serde(default = "default_degrade_on_malformed")]
    pub degrade_on_malformed: bool,
}

impl Default for ProofreadConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            rules: RuleSettings::default(),
            input: InputLimits::default(),
            degrade_on_malformed: default_degrade_on_malformed(),
        }
    }
}

impl ProofreadConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    ///
    /// # Example
    ///
    /// ```no_run
    /// use proofread_engine::config::ProofreadConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ProofreadConfig::from_file("proofread.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// ```
    /// use proofread_engine::config::{ProofreadConfig, StyleFrequency};
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = ProofreadConfig::from_str(r#"
    ///     [rules]
    ///     style_frequency = "per_occurrence"
    /// "#)?;
    /// assert_eq!(config.rules.style_frequency, StyleFrequency::PerOccurrence);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

fn default_degrade_on_malformed() -> bool {
    true
}

/// How requests reach the model provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Messages API called directly
    #[default]
    Anthropic,
    /// A relay that takes `{text, apiKey, model}` and returns the provider body
    Relay,
}

/// Model collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub wire: WireFormat,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            wire: WireFormat::default(),
            model_id: default_model_id(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_endpoint() -> String {
    ANTHROPIC_MESSAGES_URL.to_string()
}

fn default_model_id() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_timeout_ms() -> u64 {
    60_000
}

/// Whether a style substitution is reported once or at every occurrence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleFrequency {
    /// One finding per document under the "Style check" label
    #[default]
    OncePerDocument,
    /// One finding per occurrence, located by line
    PerOccurrence,
}

/// Knobs for the deterministic checkers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSettings {
    #[serde(default)]
    pub style_frequency: StyleFrequency,
    /// Characters of surrounding text kept on each side of a match
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            style_frequency: StyleFrequency::default(),
            context_chars: default_context_chars(),
        }
    }
}

fn default_context_chars() -> usize {
    10
}

/// Input validation limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputLimits {
    /// Minimum non-whitespace characters in a document
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    #[serde(default = "default_max_pdf_bytes")]
    pub max_pdf_bytes: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            max_pdf_bytes: default_max_pdf_bytes(),
        }
    }
}

fn default_min_text_chars() -> usize {
    10
}

fn default_max_pdf_bytes() -> usize {
    10 * 1024 * 1024
}
