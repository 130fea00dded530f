//! Extraction of findings from free-form model output
//!
//! The model is asked for one bullet per finding, but in practice answers in
//! several shapes. Each bullet is split once into location, payload and an
//! optional `| EXPLAIN:` segment, then handed to an ordered list of grammars;
//! the first grammar that recognizes the payload wins. Lines no grammar
//! recognizes are skipped without failing the parse.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{ErrorKind, ErrorRecord};
use tracing::debug;

const NO_ERRORS_MARKER: &str = "no errors found";

const QUOTE_CHARS: &[char] = &['"', '\u{201C}', '\u{201D}'];

lazy_static! {
    static ref EXPLAIN_DELIMITER: Regex = Regex::new(r"(?i)\|\s*explain\s*:").unwrap();

    /// "X" should be "Y"
    static ref QUOTED_SHOULD_BE: Regex = Regex::new(
        r#"(?i)["“”](?P<error>[^"“”]*)["“”]\s+should\s+be\s+["“”](?P<correction>[^"“”]*)["“”]"#
    )
    .unwrap();

    static ref SHOULD_BE: Regex = Regex::new(r"(?i)\s+should\s+be\s+").unwrap();

    /// [prefix] "X" → "Y"
    static ref QUOTED_ARROW: Regex = Regex::new(
        r#"^(?P<prefix>[^"“”]*)["“”](?P<error>[^"“”]*)["“”]\s*(?:→|->|—|–|-)\s*["“”](?P<correction>[^"“”]*)["“”]"#
    )
    .unwrap();

    /// Change "X" to "Y"
    static ref CHANGE_TO: Regex = Regex::new(
        r#"(?i)\bchange\s+["“”](?P<error>[^"“”]*)["“”]\s+to\s+["“”](?P<correction>[^"“”]*)["“”]"#
    )
    .unwrap();
}

/// A bullet line split into its structural parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bullet {
    /// Text before the first unescaped `>`, empty if the line has none
    pub location: String,
    /// Correction payload with any explanation segment removed
    pub payload: String,
    pub explanation: Option<String>,
}

impl Bullet {
    /// Split a bullet body (marker already removed). The explanation is cut
    /// off first, so a `>` inside it never becomes a location separator.
    pub fn split(body: &str) -> Self {
        let (head, explanation) = match EXPLAIN_DELIMITER.find(body) {
            Some(m) => (&body[..m.start()], Some(clean_field(&body[m.end()..]))),
            None => (body, None),
        };

        let (location, payload) = match find_unescaped_gt(head) {
            Some(idx) => (head[..idx].replace("\\>", ">"), &head[idx + 1..]),
            None => (String::new(), head),
        };

        Bullet {
            location: clean_field(&location),
            payload: payload.trim().to_string(),
            explanation: explanation.filter(|e| !e.is_empty()),
        }
    }
}

fn find_unescaped_gt(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    bytes
        .iter()
        .enumerate()
        .find(|&(i, &b)| b == b'>' && (i == 0 || bytes[i - 1] != b'\\'))
        .map(|(i, _)| i)
}

/// Trim whitespace and surrounding double quotes
fn clean_field(s: &str) -> String {
    s.trim().trim_matches(QUOTE_CHARS).trim().to_string()
}

/// What a grammar extracts from one bullet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub error_text: String,
    pub correction_text: String,
    pub explanation: Option<String>,
}

/// A grammar recognizes a bullet or declines it
pub type Grammar = fn(&Bullet) -> Option<Finding>;

/// Grammars in priority order
pub const GRAMMARS: &[(&str, Grammar)] = &[
    ("should-be-explained", should_be_explained),
    ("should-be", should_be),
    ("arrow", arrow),
    ("change-to", change_to),
];

fn should_be_pair(payload: &str) -> Option<(String, String)> {
    if let Some(caps) = QUOTED_SHOULD_BE.captures(payload) {
        return Some((clean_field(&caps["error"]), clean_field(&caps["correction"])));
    }
    let m = SHOULD_BE.find(payload)?;
    Some((
        clean_field(&payload[..m.start()]),
        clean_field(&payload[m.end()..]),
    ))
}

/// `location > "X" should be "Y" | EXPLAIN: why`
fn should_be_explained(bullet: &Bullet) -> Option<Finding> {
    let explanation = bullet.explanation.clone()?;
    let (error_text, correction_text) = should_be_pair(&bullet.payload)?;
    Some(Finding {
        error_text,
        correction_text,
        explanation: Some(explanation),
    })
}

/// `location > "X" should be "Y"`
fn should_be(bullet: &Bullet) -> Option<Finding> {
    let (error_text, correction_text) = should_be_pair(&bullet.payload)?;
    Some(Finding {
        error_text,
        correction_text,
        explanation: bullet.explanation.clone(),
    })
}

/// `location > [Capitalize] "X" → "Y"`
fn arrow(bullet: &Bullet) -> Option<Finding> {
    let caps = QUOTED_ARROW.captures(&bullet.payload)?;
    let prefix = caps["prefix"].trim().trim_end_matches(':').trim();
    let explanation = bullet
        .explanation
        .clone()
        .or_else(|| (!prefix.is_empty()).then(|| prefix.to_string()));
    Some(Finding {
        error_text: clean_field(&caps["error"]),
        correction_text: clean_field(&caps["correction"]),
        explanation,
    })
}

/// `location > Change "X" to "Y"`
fn change_to(bullet: &Bullet) -> Option<Finding> {
    let caps = CHANGE_TO.captures(&bullet.payload)?;
    Some(Finding {
        error_text: clean_field(&caps["error"]),
        correction_text: clean_field(&caps["correction"]),
        explanation: bullet.explanation.clone(),
    })
}

/// Result of parsing one model response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub records: Vec<ErrorRecord>,
    /// Bullet lines no grammar recognized
    pub skipped: usize,
    /// The model declared the document clean
    pub declared_clean: bool,
}

/// Parse model output into model-derived records
pub fn parse_response(response: &str) -> Vec<ErrorRecord> {
    parse_response_detailed(response).records
}

pub fn parse_response_detailed(response: &str) -> ParseOutcome {
    if response.to_lowercase().contains(NO_ERRORS_MARKER) {
        return ParseOutcome {
            declared_clean: true,
            ..ParseOutcome::default()
        };
    }

    let mut outcome = ParseOutcome::default();
    let bullets = response
        .lines()
        .filter_map(|line| line.trim().strip_prefix("- "));

    for (idx, body) in bullets.enumerate() {
        let bullet = Bullet::split(body);
        let matched = GRAMMARS
            .iter()
            .find_map(|(name, grammar)| grammar(&bullet).map(|finding| (*name, finding)));

        let Some((grammar, finding)) = matched else {
            debug!(line = body, "No grammar matched bullet");
            outcome.skipped += 1;
            continue;
        };

        let location = if bullet.location.is_empty() {
            format!("Issue {}", idx + 1)
        } else {
            bullet.location.clone()
        };

        match ErrorRecord::new(
            location,
            finding.error_text,
            finding.correction_text,
            ErrorKind::ModelDerived,
        ) {
            Some(record) => {
                let record = match finding.explanation {
                    Some(explanation) => record.with_explanation(explanation),
                    None => record,
                };
                debug!(grammar, "Parsed bullet");
                outcome.records.push(record);
            }
            None => {
                debug!(line = body, "Bullet matched with empty fields");
                outcome.skipped += 1;
            }
        }
    }

    outcome
}
