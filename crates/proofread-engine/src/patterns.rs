//! Rule tables and text helpers shared by the checkers

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::ErrorKind;

/// A brand-protected term and the form it must always take
pub struct BrandTerm {
    /// Lowercase spelling, words separated by single spaces
    pub term: &'static str,
    pub canonical: &'static str,
}

/// Terms that must always be capitalized
pub const BRAND_TERMS: &[BrandTerm] = &[
    BrandTerm {
        term: "team member",
        canonical: "Team Member",
    },
    BrandTerm {
        term: "membership",
        canonical: "Membership",
    },
    BrandTerm {
        term: "member",
        canonical: "Member",
    },
    BrandTerm {
        term: "guest",
        canonical: "Guest",
    },
    BrandTerm {
        term: "neighbor",
        canonical: "Neighbor",
    },
    BrandTerm {
        term: "homeowner",
        canonical: "Homeowner",
    },
    BrandTerm {
        term: "team",
        canonical: "Team",
    },
];

/// A banned term that is always replaced by a fixed phrase
pub struct StyleSubstitution {
    pub term: &'static str,
    pub replacement: &'static str,
    pub label: &'static str,
}

pub const STYLE_SUBSTITUTIONS: &[StyleSubstitution] = &[StyleSubstitution {
    term: "staff",
    replacement: "Team Member(s)",
    label: "workforce terminology",
}];

/// A word that requires diacritics
pub struct LexiconEntry {
    /// Bare lowercase spelling, words separated by single spaces
    pub bare: &'static str,
    pub accented: &'static str,
    /// Usage that the accented form applies to, when the bare word is ambiguous
    pub context: Option<&'static str>,
}

pub const ACCENT_LEXICON: &[LexiconEntry] = &[
    LexiconEntry { bare: "a la carte", accented: "à la carte", context: None },
    LexiconEntry { bare: "a la mode", accented: "à la mode", context: None },
    LexiconEntry { bare: "cafe", accented: "café", context: None },
    LexiconEntry { bare: "cafes", accented: "cafés", context: None },
    LexiconEntry { bare: "cliche", accented: "cliché", context: None },
    LexiconEntry { bare: "consomme", accented: "consommé", context: Some("soup") },
    LexiconEntry { bare: "creme brulee", accented: "crème brûlée", context: Some("dessert") },
    LexiconEntry { bare: "creme fraiche", accented: "crème fraîche", context: None },
    LexiconEntry { bare: "decor", accented: "décor", context: None },
    LexiconEntry { bare: "entree", accented: "entrée", context: Some("dish") },
    LexiconEntry { bare: "entrees", accented: "entrées", context: Some("dish") },
    LexiconEntry { bare: "fiance", accented: "fiancé", context: None },
    LexiconEntry { bare: "fiancee", accented: "fiancée", context: None },
    LexiconEntry { bare: "flambe", accented: "flambé", context: None },
    LexiconEntry { bare: "jalapeno", accented: "jalapeño", context: None },
    LexiconEntry { bare: "jalapenos", accented: "jalapeños", context: None },
    LexiconEntry { bare: "nee", accented: "née", context: None },
    LexiconEntry { bare: "pina colada", accented: "piña colada", context: Some("cocktail") },
    LexiconEntry { bare: "protege", accented: "protégé", context: None },
    LexiconEntry { bare: "puree", accented: "purée", context: None },
    LexiconEntry { bare: "remoulade", accented: "rémoulade", context: Some("sauce") },
    LexiconEntry { bare: "resume", accented: "résumé", context: Some("CV") },
    LexiconEntry { bare: "resumes", accented: "résumés", context: Some("CV") },
    LexiconEntry { bare: "rose", accented: "rosé", context: Some("wine") },
    LexiconEntry { bare: "saute", accented: "sauté", context: None },
    LexiconEntry { bare: "sauteed", accented: "sautéed", context: None },
    LexiconEntry { bare: "soiree", accented: "soirée", context: None },
    LexiconEntry { bare: "souffle", accented: "soufflé", context: None },
];

/// Compiled form of a table entry: one case-insensitive whole-word pattern
pub struct RuleDefinition {
    /// Table spelling the pattern was built from
    pub term: &'static str,
    pub pattern: Regex,
    /// Corrected form written into `correction_text`
    pub canonical: &'static str,
    /// Human label used in explanations
    pub label: &'static str,
    pub kind: ErrorKind,
    /// Number of words in the term; multi-word rules are applied first
    pub words: usize,
    /// Extra usage note carried into explanations
    pub context: Option<&'static str>,
}

/// Build a whole-word pattern for `term`. Inner spaces match any run of
/// whitespace; `plural` adds an optional captured `s` suffix.
pub fn word_pattern(term: &str, plural: bool) -> Regex {
    let body = term
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let suffix = if plural { "(s)?" } else { "" };
    Regex::new(&format!(r"(?i)\b{}{}\b", body, suffix)).unwrap()
}

fn sorted_longest_first(mut rules: Vec<RuleDefinition>) -> Vec<RuleDefinition> {
    // Stable, so equal word counts keep table order
    rules.sort_by(|a, b| b.words.cmp(&a.words));
    rules
}

lazy_static! {
    pub static ref BRAND_RULES: Vec<RuleDefinition> = sorted_longest_first(
        BRAND_TERMS
            .iter()
            .map(|t| RuleDefinition {
                term: t.term,
                pattern: word_pattern(t.term, true),
                canonical: t.canonical,
                label: t.canonical,
                kind: ErrorKind::Capitalization,
                words: t.term.split_whitespace().count(),
                context: None,
            })
            .collect()
    );

    pub static ref STYLE_RULES: Vec<RuleDefinition> = sorted_longest_first(
        STYLE_SUBSTITUTIONS
            .iter()
            .map(|s| RuleDefinition {
                term: s.term,
                pattern: word_pattern(s.term, false),
                canonical: s.replacement,
                label: s.label,
                kind: ErrorKind::Style,
                words: s.term.split_whitespace().count(),
                context: None,
            })
            .collect()
    );

    pub static ref ACCENT_RULES: Vec<RuleDefinition> = sorted_longest_first(
        ACCENT_LEXICON
            .iter()
            .map(|e| RuleDefinition {
                term: e.bare,
                pattern: word_pattern(e.bare, false),
                canonical: e.accented,
                label: e.accented,
                kind: ErrorKind::Accent,
                words: e.bare.split_whitespace().count(),
                context: e.context,
            })
            .collect()
    );
}

/// Byte spans already reported by a more specific rule
#[derive(Debug, Default)]
pub struct ClaimedSpans {
    spans: Vec<(usize, usize)>,
}

impl ClaimedSpans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans.iter().any(|&(s, e)| start < e && s < end)
    }

    pub fn claim(&mut self, start: usize, end: usize) {
        self.spans.push((start, end));
    }
}

/// Up to `chars` characters either side of `[start, end)`, with ellipses
/// where the line continues. Offsets must sit on char boundaries.
pub fn snippet_around(line: &str, start: usize, end: usize, chars: usize) -> String {
    let before: String = {
        let mut rev: Vec<char> = line[..start].chars().rev().take(chars).collect();
        rev.reverse();
        rev.into_iter().collect()
    };
    let after: String = line[end..].chars().take(chars).collect();

    let lead = if before.len() < start { "..." } else { "" };
    let trail = if end + after.len() < line.len() { "..." } else { "" };

    format!("{}{}{}{}{}", lead, before, &line[start..end], after, trail)
        .trim()
        .to_string()
}

/// True when the whitespace-delimited token around `[start, end)` is an
/// e-mail address or a web address
pub fn inside_address(line: &str, start: usize, end: usize) -> bool {
    let token_start = line[..start]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let token_end = line[end..]
        .find(char::is_whitespace)
        .map(|i| end + i)
        .unwrap_or(line.len());
    let token = line[token_start..token_end].to_lowercase();

    token.contains('@') || token.contains("://") || token.starts_with("www.")
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Title Case a single word ("MONDAY" -> "Monday")
pub fn title_case(word: &str) -> String {
    capitalize_first(&word.to_lowercase())
}

/// Apply the capitalization pattern of `original` to `replacement`
pub fn mirror_case(original: &str, replacement: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    let all_upper = letters.len() > 1 && letters.iter().all(|c| c.is_uppercase());

    if all_upper {
        replacement.to_uppercase()
    } else if original.chars().next().is_some_and(|c| c.is_uppercase()) {
        capitalize_first(replacement)
    } else {
        replacement.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_pattern_respects_boundaries() {
        let re = word_pattern("member", true);
        assert!(re.is_match("our member club"));
        assert!(re.is_match("all MEMBERS welcome"));
        assert!(!re.is_match("membership drive"));
        assert!(!re.is_match("remember this"));
    }

    #[test]
    fn test_multi_word_pattern_spans_whitespace() {
        let re = word_pattern("team member", true);
        assert!(re.is_match("every team  member"));
        assert!(re.is_match("team\tmembers"));
        assert!(!re.is_match("teammember"));
    }

    #[test]
    fn test_brand_rules_multi_word_first() {
        assert_eq!(BRAND_RULES[0].canonical, "Team Member");
        assert!(BRAND_RULES[1..].iter().all(|r| r.words == 1));
    }

    #[test]
    fn test_snippet_around() {
        let line = "Please welcome our newest member to the club today";
        let start = line.find("member").unwrap();
        let snippet = snippet_around(line, start, start + 6, 10);
        assert_eq!(snippet, "...ur newest member to the cl...");
    }

    #[test]
    fn test_snippet_at_line_edges() {
        let line = "member club";
        assert_eq!(snippet_around(line, 0, 6, 10), "member club");
    }

    #[test]
    fn test_snippet_handles_multibyte() {
        let line = "café café member café café";
        let start = line.find("member").unwrap();
        let snippet = snippet_around(line, start, start + 6, 3);
        assert_eq!(snippet, "...fé member ca...");
    }

    #[test]
    fn test_inside_address() {
        let line = "Write to membership@club.com or visit www.members.org today";
        let email = line.find("membership").unwrap();
        assert!(inside_address(line, email, email + 10));
        let web = line.find("members.org").unwrap();
        assert!(inside_address(line, web, web + 7));
        let today = line.find("today").unwrap();
        assert!(!inside_address(line, today, today + 5));
    }

    #[test]
    fn test_mirror_case() {
        assert_eq!(mirror_case("cafe", "café"), "café");
        assert_eq!(mirror_case("Cafe", "café"), "Café");
        assert_eq!(mirror_case("CAFE", "café"), "CAFÉ");
        assert_eq!(mirror_case("Creme brulee", "crème brûlée"), "Crème brûlée");
    }

    #[test]
    fn test_claimed_spans() {
        let mut claimed = ClaimedSpans::new();
        claimed.claim(5, 16);
        assert!(claimed.overlaps(10, 16));
        assert!(!claimed.overlaps(0, 5));
        assert!(!claimed.overlaps(16, 20));
    }
}
