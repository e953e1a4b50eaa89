//! Keyword rule tables: category extraction and closure-signal detection.
//!
//! Rules are data, not branching code. Each category is an independent
//! (label, pattern) entry matched against lowercase-folded text; matches are
//! unioned across rules (multi-label). A second pass picks up
//! class-of-competition codes (`A-22`, `B-01`, `ADS`, `ADM`) and adds a
//! `cdc:`-prefixed label per unique code. If nothing matched at all, the
//! result is exactly the sentinel `varie`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Sentinel category for postings no rule recognized.
pub const FALLBACK_CATEGORY: &str = "varie";

/// Prefix for class-of-competition labels, e.g. `cdc:A-22`.
pub const CDC_PREFIX: &str = "cdc:";

struct CategoryRule {
    label: &'static str,
    pattern: Regex,
}

static CATEGORY_RULES: Lazy<Vec<CategoryRule>> = Lazy::new(|| {
    [
        ("interpello", r"\binterpello\b|chiamata|convocazione"),
        ("mad", r"messa a disposizione|\bmad\b"),
        ("supplenza", r"supplenz"),
        ("reclutamento", r"reclutamento|recluta"),
        ("bando", r"\bbando\b|\bbandi\b"),
        ("avviso", r"\bavviso\b|\bavvisi\b"),
        ("graduatoria", r"graduatori"),
        ("incarico", r"incaric"),
        ("concorso", r"\bconcorso\b|\bconcorsi\b"),
        ("esito", r"esito|esiti|finale"),
        ("docenti", r"docent|classe di concorso|c\.?d\.?c\.?"),
        (
            "ata",
            r"\bata\b|assistente|collaboratore scolastico|\baa\b|\bat\b|\bcs\b",
        ),
        ("assistente amministrativo", r"assistente amministrativ|\baa\b"),
        ("assistente tecnico", r"assistente tecnic|\bat\b"),
        ("collaboratore scolastico", r"collaboratore scolastic|\bcs\b"),
        ("educatore", r"educator|educativi"),
        ("dirigente", r"dirigente scolastic"),
    ]
    .into_iter()
    .map(|(label, pattern)| CategoryRule {
        label,
        pattern: Regex::new(pattern).expect("category rule regex"),
    })
    .collect()
});

static CDC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(a-\d{2}|b-\d{2}|ad[sm])\b").expect("cdc regex"));

/// Substrings that suggest a posting is no longer active. Heuristic only;
/// authoritative closure happens in the refresher.
const CLOSE_WORDS: &[&str] = &[
    "revoca",
    "esito",
    "chiuso",
    "chiusura",
    "non più disponibile",
    "nomine effettuate",
    "posti coperti",
    "scadenz",
    "graduatoria definitiva",
];

/// Classify text into category labels.
///
/// Always returns a non-empty, deduplicated, sorted set; contains the
/// sentinel iff no rule pattern matched.
pub fn extract_categories(text: &str) -> Vec<String> {
    let folded = text.to_lowercase();
    let mut cats: BTreeSet<String> = BTreeSet::new();
    for rule in CATEGORY_RULES.iter() {
        if rule.pattern.is_match(&folded) {
            cats.insert(rule.label.to_string());
        }
    }
    for code in CDC_RE.find_iter(&folded) {
        cats.insert(format!("{}{}", CDC_PREFIX, code.as_str().to_uppercase()));
    }
    if cats.is_empty() {
        cats.insert(FALLBACK_CATEGORY.to_string());
    }
    cats.into_iter().collect()
}

/// True if the text carries any closure keyword as a case-insensitive
/// substring.
pub fn is_closed_text(text: &str) -> bool {
    let folded = text.to_lowercase();
    CLOSE_WORDS.iter().any(|k| folded.contains(k))
}

/// True if the label set carries anything beyond the sentinel. Used by the
/// page-scrape fallback to drop navigation links.
pub fn has_real_category(categories: &[String]) -> bool {
    categories.iter().any(|c| c != FALLBACK_CATEGORY)
}
