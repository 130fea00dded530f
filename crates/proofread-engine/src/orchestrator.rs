//! One proofreading run: validate, check, ask the model, parse, merge

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use shared_types::{ErrorKind, ErrorRecord, ProofreadContext};
use tracing::{info, warn};

use crate::client::{ModelClient, ModelRequest};
use crate::config::ProofreadConfig;
use crate::error::{ModelError, ProofreadError};
use crate::parser::parse_response_detailed;
use crate::prompt::build_prompt;
use crate::ranking::merge;
use crate::ProofreadEngine;

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofreadReport {
    /// Findings in display order
    pub errors: Vec<ErrorRecord>,
    /// Only rule-engine findings are present
    pub partial: bool,
    pub notice: Option<String>,
    pub rule_count: usize,
    pub model_count: usize,
    /// Model bullets no grammar recognized
    pub skipped_bullets: usize,
}

impl ProofreadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs proofreading against a shared model client.
///
/// Holds no per-run state; share one behind an `Arc` across tasks.
pub struct Proofreader {
    client: Arc<dyn ModelClient>,
    engine: ProofreadEngine,
    config: ProofreadConfig,
}

impl Proofreader {
    pub fn new(client: Arc<dyn ModelClient>, config: ProofreadConfig) -> Self {
        Self {
            client,
            engine: ProofreadEngine::with_settings(config.rules.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ProofreadConfig {
        &self.config
    }

    /// Reject input before any work is done
    pub fn validate(
        &self,
        text: &str,
        context: &ProofreadContext,
        api_key: &str,
    ) -> Result<(), ProofreadError> {
        let chars = text.chars().filter(|c| !c.is_whitespace()).count();
        if chars == 0 {
            return Err(ProofreadError::Input("Text is empty".to_string()));
        }
        if chars < self.config.input.min_text_chars {
            return Err(ProofreadError::Input(format!(
                "Text is too short ({} characters, minimum {})",
                chars, self.config.input.min_text_chars
            )));
        }
        if context.metadata.document_type.trim().is_empty() {
            return Err(ProofreadError::Input(
                "Document type is required".to_string(),
            ));
        }
        if api_key.trim().is_empty() {
            return Err(ProofreadError::Input("API key is required".to_string()));
        }
        Ok(())
    }

    pub async fn run(
        &self,
        text: &str,
        context: &ProofreadContext,
        api_key: &str,
        model_id: Option<&str>,
    ) -> Result<ProofreadReport, ProofreadError> {
        self.run_with_cancel(text, context, api_key, model_id, std::future::pending())
            .await
    }

    /// Like [`run`](Self::run), abandoning the model call as soon as
    /// `cancel` resolves
    pub async fn run_with_cancel<C>(
        &self,
        text: &str,
        context: &ProofreadContext,
        api_key: &str,
        model_id: Option<&str>,
        cancel: C,
    ) -> Result<ProofreadReport, ProofreadError>
    where
        C: Future<Output = ()>,
    {
        self.validate(text, context, api_key)?;

        let rule_errors = self.engine.check_text(text, &context.years);
        let rule_count = rule_errors.len();

        let request = ModelRequest {
            prompt_text: build_prompt(text, context),
            api_key: api_key.to_string(),
            model_id: model_id
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(self.config.model.model_id.as_str())
                .to_string(),
        };

        let timeout_ms = self.config.model.timeout_ms;
        let call = tokio::time::timeout(self.config.model.timeout(), self.client.complete(&request));

        let outcome = tokio::select! {
            biased;
            _ = cancel => {
                warn!("Proofreading run cancelled during model call");
                return Err(ProofreadError::Cancelled);
            }
            outcome = call => outcome,
        };

        let response = match outcome {
            Err(_) => {
                warn!(timeout_ms, "Model request timed out");
                return Err(ProofreadError::Timeout { ms: timeout_ms });
            }
            Ok(Err(ModelError::MalformedResponse(reason))) if self.config.degrade_on_malformed => {
                warn!(%reason, "Malformed model response, returning rule findings only");
                let notice = format!(
                    "The AI review could not be read ({}); showing automated checks only",
                    reason
                );
                return Ok(ProofreadReport {
                    errors: merge(rule_errors, Vec::new()),
                    partial: true,
                    notice: Some(notice),
                    rule_count,
                    model_count: 0,
                    skipped_bullets: 0,
                });
            }
            Ok(result) => result?,
        };

        let parsed = parse_response_detailed(&response);
        let model_count = parsed.records.len();
        let errors = merge(rule_errors, parsed.records);

        info!(
            rule_count,
            model_count,
            skipped = parsed.skipped,
            total = errors.len(),
            "Proofreading run complete"
        );

        Ok(ProofreadReport {
            errors,
            partial: false,
            notice: None,
            rule_count,
            model_count,
            skipped_bullets: parsed.skipped,
        })
    }
}

/// Count records of one kind
pub fn count_kind(records: &[ErrorRecord], kind: ErrorKind) -> usize {
    records.iter().filter(|r| r.kind() == kind).count()
}
