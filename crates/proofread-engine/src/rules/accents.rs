use crate::config::RuleSettings;
use crate::patterns::{mirror_case, snippet_around, ClaimedSpans, ACCENT_RULES};
use shared_types::ErrorRecord;

pub const ACCENT_LOCATION: &str = "Accent check";

/// Flag every occurrence of a lexicon word written without its diacritics
pub fn check_accents(text: &str) -> Vec<ErrorRecord> {
    check_accents_with(text, &RuleSettings::default())
}

pub fn check_accents_with(text: &str, settings: &RuleSettings) -> Vec<ErrorRecord> {
    let mut claimed = ClaimedSpans::new();
    let mut found = Vec::new();

    for rule in ACCENT_RULES.iter() {
        for m in rule.pattern.find_iter(text) {
            if claimed.overlaps(m.start(), m.end()) {
                continue;
            }
            claimed.claim(m.start(), m.end());

            let correction = mirror_case(m.as_str(), rule.canonical);
            let explanation = match rule.context {
                Some(usage) => format!("Add accent: \"{}\" ({})", rule.label, usage),
                None => format!("Add accent: \"{}\"", rule.label),
            };
            let line = line_around(text, m.start(), m.end());
            let record = ErrorRecord::new(ACCENT_LOCATION, m.as_str(), correction, rule.kind).map(
                |r| {
                    r.with_explanation(explanation).with_context(snippet_around(
                        line.text,
                        m.start() - line.offset,
                        m.end() - line.offset,
                        settings.context_chars,
                    ))
                },
            );
            if let Some(record) = record {
                found.push((m.start(), record));
            }
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, r)| r).collect()
}

struct LineSlice<'a> {
    text: &'a str,
    offset: usize,
}

/// The line containing `[start, end)`; multi-word matches may span a break,
/// in which case the slice covers every line they touch
fn line_around(text: &str, start: usize, end: usize) -> LineSlice<'_> {
    let offset = text[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let stop = text[end..].find('\n').map(|i| end + i).unwrap_or(text.len());
    LineSlice {
        text: &text[offset..stop],
        offset,
    }
}
