//! Serializations of a finished report for copy/paste and spreadsheets

use serde::Serialize;
use shared_types::ErrorRecord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),

    #[error("CSV output was not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One line per record: `- {location} > "{error}" should be "{correction}"`
pub fn to_plain_text(records: &[ErrorRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "- {} > \"{}\" should be \"{}\"\n",
                r.location(),
                r.error_text(),
                r.correction_text()
            )
        })
        .collect()
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Error")]
    error: &'a str,
    #[serde(rename = "Correction")]
    correction: &'a str,
    #[serde(rename = "Type")]
    kind: &'static str,
    #[serde(rename = "Explanation")]
    explanation: &'a str,
}

/// Header row plus one row per record
pub fn to_csv(records: &[ErrorRecord]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    if records.is_empty() {
        wtr.write_record(["Location", "Error", "Correction", "Type", "Explanation"])?;
    }
    for r in records {
        wtr.serialize(CsvRow {
            location: r.location(),
            error: r.error_text(),
            correction: r.correction_text(),
            kind: r.kind().label(),
            explanation: r.explanation().unwrap_or_default(),
        })?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

/// "3 issues found" / "1 issue found" / "No issues found"
pub fn summary_line(count: usize) -> String {
    match count {
        0 => "No issues found".to_string(),
        1 => "1 issue found".to_string(),
        n => format!("{} issues found", n),
    }
}
