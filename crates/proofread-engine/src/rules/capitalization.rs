use crate::config::RuleSettings;
use crate::patterns::{inside_address, snippet_around, ClaimedSpans, BRAND_RULES};
use shared_types::ErrorRecord;

/// Flag brand-protected terms written in lowercase, one finding per occurrence
pub fn check_capitalization(text: &str) -> Vec<ErrorRecord> {
    check_capitalization_with(text, &RuleSettings::default())
}

pub fn check_capitalization_with(text: &str, settings: &RuleSettings) -> Vec<ErrorRecord> {
    let mut records = Vec::new();

    for (idx, raw_line) in text.split('\n').enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let mut claimed = ClaimedSpans::new();
        let mut line_records = Vec::new();

        for rule in BRAND_RULES.iter() {
            for caps in rule.pattern.captures_iter(line) {
                let Some(m) = caps.get(0) else { continue };
                if claimed.overlaps(m.start(), m.end()) {
                    continue;
                }
                // Claimed even when correct so "Team member" is not re-read as "member"
                claimed.claim(m.start(), m.end());

                if !needs_capital(m.as_str()) || inside_address(line, m.start(), m.end()) {
                    continue;
                }

                let suffix = caps.get(1).map(|s| s.as_str()).unwrap_or("");
                let correction = format!("{}{}", rule.canonical, suffix);
                let record = ErrorRecord::new(
                    format!("Line {}", idx + 1),
                    m.as_str(),
                    correction,
                    rule.kind,
                )
                .map(|r| {
                    r.with_explanation(format!(
                        "\"{}\" is always capitalized",
                        rule.label
                    ))
                    .with_context(snippet_around(
                        line,
                        m.start(),
                        m.end(),
                        settings.context_chars,
                    ))
                });

                if let Some(record) = record {
                    line_records.push((m.start(), record));
                }
            }
        }

        // Rules run longest-first; report in reading order within the line
        line_records.sort_by_key(|(start, _)| *start);
        records.extend(line_records.into_iter().map(|(_, r)| r));
    }

    records
}

/// A match needs fixing when any of its words starts with a lowercase letter
fn needs_capital(matched: &str) -> bool {
    matched
        .split_whitespace()
        .any(|word| word.chars().next().is_some_and(|c| c.is_lowercase()))
}
