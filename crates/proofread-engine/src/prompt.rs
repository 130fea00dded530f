//! Proofreading prompt construction
//!
//! The prompt is a fixed guideline template with three inserts: a context
//! block describing the document, the year range used for date checks, and a
//! timestamped end marker so no two requests are byte-identical.

use chrono::{DateTime, SecondsFormat, Utc};
use shared_types::ProofreadContext;

const GUIDELINES_HEAD: &str = "You are a professional proofreader for a private club and hospitality company. \
Review the text below and identify ALL errors according to these guidelines.

CAPITALIZATION - CHECK EVERY INSTANCE:
1. Always capitalize \"Member\", \"Membership\" (except inside email addresses), \"Guest\", \"Neighbor\", \"Homeowner\", \"Team\" and \"Team Member\"
2. Replace every \"staff\" with \"Team Member(s)\"
3. \"Club\" is capitalized only as part of an actual club name (\"Northland Country Club\", but \"the club\")
4. Job titles are capitalized only for a specific named person (\"Joe Williams, Superintendent\", but \"all superintendents\")
5. \"Golf Course\" is capitalized only with a specific course name
6. Room names are capitalized only when specific (\"Fireside Dining Room\", but \"dining room\")
7. \"Company\" is capitalized only as part of a specific company name
8. Department names are capitalized only before a program name
9. Never capitalize unless part of a proper noun: golf course, golf shop, clubhouse, scramble, best ball, caddie, pool, courts, driving range, practice facility, community, passholder, swim center

STYLE:
";

const GUIDELINES_TAIL: &str = "2. Keep spacing consistent (if \"7AM\" appears, every time is written \"7AM\", not \"8 AM\")
3. Hyphenate compound adjectives before nouns (\"18-hole course\", but \"the course is 18 holes\")
4. Remove hyphens from standalone nouns such as \"18-holes\" or \"9-holes\"
5. Check accent marks on borrowed words (café, résumé, née, fiancé, rémoulade, rosé)
6. Verify the spelling of every word
7. Apply AP style for punctuation and grammar
8. Check brand names for exact spelling and punctuation
9. Keep state names and abbreviations consistent
10. Check compound versus separate words (\"email\", not \"e-mail\")

Check the entire document word by word, headers included (flag only spelling and punctuation in headers). \
Do not assume any word is correct.

OUTPUT FORMAT - one bullet per error, nothing else:
- [Location] > \"[error]\" should be \"[correction]\" | EXPLAIN: [short reason]

Examples:
- Page 2, Paragraph 3 > \"member\" should be \"Member\" | EXPLAIN: brand capitalization
- Hours Section > \"18-holes\" should be \"18 holes\" | EXPLAIN: no hyphen in standalone noun
- Wine List > \"Rose\" should be \"Rosé\" | EXPLAIN: accent mark

If the document has no errors, reply with exactly: No errors found.

TEXT TO PROOFREAD:
";

/// Render the document context block
fn context_block(context: &ProofreadContext) -> String {
    let mut block = String::from("DOCUMENT CONTEXT:\n");
    let document_type = context.metadata.document_type.trim();
    if !document_type.is_empty() {
        block.push_str(&format!("- Document type: {}\n", document_type));
    }
    block.push_str(&format!("- Year(s): {}\n", context.years));
    if let Some(notes) = context
        .metadata
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        block.push_str(&format!("- Notes: {}\n", notes));
    }
    block.push('\n');
    block
}

/// Build the full prompt for `text` with an explicit timestamp
pub fn build_prompt_at(text: &str, context: &ProofreadContext, timestamp: DateTime<Utc>) -> String {
    let mut prompt = context_block(context);
    prompt.push_str(GUIDELINES_HEAD);
    prompt.push_str(&format!(
        "1. Verify every date (if the text says \"Wednesday, March 5\", confirm March 5 is a Wednesday in {})\n",
        context.years
    ));
    prompt.push_str(GUIDELINES_TAIL);
    prompt.push_str(text);
    prompt.push_str(&format!(
        "\n\n=== END OF DOCUMENT (Timestamp: {}) ===",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    prompt
}

/// Build the full prompt stamped with the current time
pub fn build_prompt(text: &str, context: &ProofreadContext) -> String {
    build_prompt_at(text, context, Utc::now())
}
