use std::collections::HashSet;

use shared_types::{ErrorKind, ErrorRecord};

/// Combine rule and model findings into display order.
///
/// Model-derived records that repeat an earlier one verbatim (same location,
/// error and correction) are dropped. Rule records are never deduplicated
/// here; each checker already owns its own repetition policy. The final sort
/// is stable, so records of equal priority keep their producer's order.
pub fn merge(rule_errors: Vec<ErrorRecord>, model_errors: Vec<ErrorRecord>) -> Vec<ErrorRecord> {
    let mut seen: HashSet<(String, String, String)> = HashSet::new();

    let mut merged: Vec<ErrorRecord> = rule_errors
        .into_iter()
        .chain(model_errors)
        .filter(|record| {
            record.kind() != ErrorKind::ModelDerived
                || seen.insert((
                    record.location().to_string(),
                    record.error_text().to_string(),
                    record.correction_text().to_string(),
                ))
        })
        .collect();

    merged.sort_by_key(|record| record.kind().priority());
    merged
}
