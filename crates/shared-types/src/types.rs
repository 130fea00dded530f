use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Category of a finding. Drives display order and synthesized explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Capitalization,
    Date,
    Style,
    Accent,
    ModelDerived,
}

impl ErrorKind {
    /// Display rank, lower sorts first
    pub fn priority(self) -> u8 {
        match self {
            ErrorKind::Date => 0,
            ErrorKind::Capitalization => 1,
            ErrorKind::Accent => 2,
            ErrorKind::Style => 3,
            ErrorKind::ModelDerived => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Capitalization => "Capitalization",
            ErrorKind::Date => "Date",
            ErrorKind::Style => "Style",
            ErrorKind::Accent => "Accent",
            ErrorKind::ModelDerived => "AI review",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single located correction.
///
/// Fields are read-only once built; use the `with_*` builders while the
/// record is still owned by the checker that produced it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ErrorRecord {
    location: String,
    error_text: String,
    correction_text: String,
    kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

impl ErrorRecord {
    /// Returns `None` when the location is blank or when both the error and
    /// the correction text are blank.
    pub fn new(
        location: impl Into<String>,
        error_text: impl Into<String>,
        correction_text: impl Into<String>,
        kind: ErrorKind,
    ) -> Option<Self> {
        let location = location.into();
        let error_text = error_text.into();
        let correction_text = correction_text.into();

        if location.trim().is_empty() {
            return None;
        }
        if error_text.trim().is_empty() && correction_text.trim().is_empty() {
            return None;
        }

        Some(Self {
            location,
            error_text,
            correction_text,
            kind,
            explanation: None,
            context: None,
        })
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        let explanation = explanation.into();
        self.explanation = if explanation.trim().is_empty() {
            None
        } else {
            Some(explanation)
        };
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    pub fn correction_text(&self) -> &str {
        &self.correction_text
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

/// Errors raised when a year or year range cannot be accepted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateContextError {
    #[error("Year range is reversed: {start} comes after {end}")]
    Reversed { start: i32, end: i32 },

    #[error("Year {0} is outside the supported range 1900-2200")]
    OutOfRange(i32),

    #[error("Unrecognized year format '{0}' (expected e.g. \"2025\" or \"2024-2025\")")]
    Format(String),
}

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2200;

/// Inclusive year range used when validating weekday/date pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "YearInput", into = "YearSpan")]
pub struct DateContext {
    start: i32,
    end: i32,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct YearSpan {
    start: i32,
    end: i32,
}

/// Accepted JSON shapes: `{"start": 2024, "end": 2025}`, `2025`, `"2024-2025"`
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum YearInput {
    Span(YearSpan),
    Year(i32),
    Text(String),
}

impl TryFrom<YearInput> for DateContext {
    type Error = DateContextError;

    fn try_from(input: YearInput) -> Result<Self, Self::Error> {
        match input {
            YearInput::Span(span) => DateContext::range(span.start, span.end),
            YearInput::Year(year) => DateContext::single(year),
            YearInput::Text(text) => text.parse(),
        }
    }
}

impl From<DateContext> for YearSpan {
    fn from(ctx: DateContext) -> Self {
        YearSpan {
            start: ctx.start,
            end: ctx.end,
        }
    }
}

impl DateContext {
    pub fn single(year: i32) -> Result<Self, DateContextError> {
        Self::range(year, year)
    }

    pub fn range(start: i32, end: i32) -> Result<Self, DateContextError> {
        for year in [start, end] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(DateContextError::OutOfRange(year));
            }
        }
        if start > end {
            return Err(DateContextError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    pub fn is_single_year(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for DateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_year() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for DateContext {
    type Err = DateContextError;

    /// Accepts "2025", "2024-2025", "2024 - 2025" and "2024/2025"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parse_year = |part: &str| {
            let part = part.trim();
            if part.len() != 4 {
                return Err(DateContextError::Format(s.to_string()));
            }
            part.parse::<i32>()
                .map_err(|_| DateContextError::Format(s.to_string()))
        };

        match trimmed.split_once(['-', '/']) {
            Some((start, end)) => DateContext::range(parse_year(start)?, parse_year(end)?),
            None => DateContext::single(parse_year(trimmed)?),
        }
    }
}

/// Caller-supplied facts about the document being proofread
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProjectMetadata {
    /// e.g. "Newsletter", "Menu", "Event flyer"
    #[serde(default)]
    pub document_type: String,

    /// Free-text notes passed through to the model prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Everything a single proofreading run needs besides the text itself
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProofreadContext {
    pub years: DateContext,
    #[serde(flatten)]
    pub metadata: ProjectMetadata,
}

impl ProofreadContext {
    pub fn new(years: DateContext, document_type: impl Into<String>) -> Self {
        Self {
            years,
            metadata: ProjectMetadata {
                document_type: document_type.into(),
                notes: None,
            },
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.metadata.notes = Some(notes.into());
        self
    }
}
