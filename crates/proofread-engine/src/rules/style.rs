use crate::config::{RuleSettings, StyleFrequency};
use crate::patterns::{inside_address, snippet_around, STYLE_RULES};
use shared_types::ErrorRecord;

pub const STYLE_LOCATION: &str = "Style check";

/// Flag banned terms that must be replaced wholesale
pub fn check_style(text: &str) -> Vec<ErrorRecord> {
    check_style_with(text, &RuleSettings::default())
}

pub fn check_style_with(text: &str, settings: &RuleSettings) -> Vec<ErrorRecord> {
    let mut records = Vec::new();

    for rule in STYLE_RULES.iter() {
        let explanation = format!(
            "Replace \"{}\" with \"{}\" ({})",
            rule.term,
            rule.canonical,
            rule.label
        );

        match settings.style_frequency {
            StyleFrequency::OncePerDocument => {
                let Some(m) = rule
                    .pattern
                    .find_iter(text)
                    .find(|m| !inside_address(text, m.start(), m.end()))
                else {
                    continue;
                };
                if let Some(record) =
                    ErrorRecord::new(STYLE_LOCATION, m.as_str(), rule.canonical, rule.kind)
                {
                    records.push(record.with_explanation(explanation));
                }
            }
            StyleFrequency::PerOccurrence => {
                for (idx, raw_line) in text.split('\n').enumerate() {
                    let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
                    for m in rule.pattern.find_iter(line) {
                        if inside_address(line, m.start(), m.end()) {
                            continue;
                        }
                        let record = ErrorRecord::new(
                            format!("Line {}", idx + 1),
                            m.as_str(),
                            rule.canonical,
                            rule.kind,
                        )
                        .map(|r| {
                            r.with_explanation(explanation.clone()).with_context(
                                snippet_around(line, m.start(), m.end(), settings.context_chars),
                            )
                        });
                        if let Some(record) = record {
                            records.push(record);
                        }
                    }
                }
            }
        }
    }

    records
}
