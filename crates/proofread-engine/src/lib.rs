pub mod calendar;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod parser;
pub mod patterns;
pub mod prompt;
pub mod ranking;
pub mod rules;

pub use client::{HttpModelClient, ModelClient, ModelRequest};
pub use config::ProofreadConfig;
pub use error::{ModelError, ProofreadError};
pub use orchestrator::{ProofreadReport, Proofreader};
pub use parser::{parse_response, parse_response_detailed, ParseOutcome};
pub use ranking::merge;

use config::RuleSettings;
use shared_types::{DateContext, ErrorRecord};

/// Deterministic rule engine entry point
#[derive(Debug, Clone, Default)]
pub struct ProofreadEngine {
    settings: RuleSettings,
}

impl ProofreadEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RuleSettings) -> Self {
        Self { settings }
    }

    /// Run every rule checker over `text`, in checker order
    pub fn check_text(&self, text: &str, years: &DateContext) -> Vec<ErrorRecord> {
        let mut errors = Vec::new();
        errors.extend(rules::capitalization::check_capitalization_with(
            text,
            &self.settings,
        ));
        errors.extend(rules::dates::check_dates(text, years));
        errors.extend(rules::accents::check_accents_with(text, &self.settings));
        errors.extend(rules::style::check_style_with(text, &self.settings));
        errors
    }
}
