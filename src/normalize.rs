//! Normalization of raw candidates into the canonical posting shape.

use crate::retrieve::RawCandidate;
use crate::sources::Source;
use crate::store::NewPosting;

pub const MAX_TITLE_CHARS: usize = 500;
pub const MAX_ABSTRACT_CHARS: usize = 3000;
pub const FALLBACK_TITLE: &str = "Avviso";

/// Map one candidate plus its source into a posting ready for upsert.
///
/// Deadline extraction from free text is not attempted; `scadenza` stays
/// unset until some future enrichment fills it.
pub fn to_posting(candidate: &RawCandidate, source: &Source) -> NewPosting {
    let title = truncate_chars(candidate.title.trim(), MAX_TITLE_CHARS);
    NewPosting {
        source_name: if source.name.is_empty() {
            source.base_url.clone()
        } else {
            source.name.clone()
        },
        source_url: source.base_url.clone(),
        url: candidate.url.clone(),
        title: if title.is_empty() {
            FALLBACK_TITLE.to_string()
        } else {
            title
        },
        abstract_text: truncate_chars(&candidate.summary, MAX_ABSTRACT_CHARS),
        regione: source.regione.clone(),
        provincia: source.provincia.clone(),
        comune: source.comune.clone(),
        scuola: source.name.clone(),
        classe: None,
        categorie: candidate.categorie.clone(),
        is_open: candidate.is_open,
        scadenza: None,
        pubblicato_il: candidate.published,
        allegati: Vec::new(),
    }
}

/// Char-safe truncation; byte slicing would split multibyte Italian text.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceTier;

    fn source() -> Source {
        Source {
            name: "IC Leopardi".into(),
            base_url: "https://icleopardi.edu.it".into(),
            rss_url: None,
            regione: "Marche".into(),
            provincia: "AN".into(),
            comune: "Ancona".into(),
            tier: SourceTier::Scuola,
        }
    }

    fn candidate() -> RawCandidate {
        RawCandidate {
            url: "https://icleopardi.edu.it/albo/1".into(),
            title: "  Interpello docenti  ".into(),
            summary: "Supplenza breve A-22".into(),
            published: None,
            categorie: vec!["interpello".into()],
            is_open: true,
        }
    }

    #[test]
    fn copies_location_and_trims_title() {
        let p = to_posting(&candidate(), &source());
        assert_eq!(p.title, "Interpello docenti");
        assert_eq!(p.regione, "Marche");
        assert_eq!(p.scuola, "IC Leopardi");
        assert!(p.scadenza.is_none());
        assert!(p.allegati.is_empty());
    }

    #[test]
    fn empty_title_gets_fallback() {
        let mut c = candidate();
        c.title = "   ".into();
        let p = to_posting(&c, &source());
        assert_eq!(p.title, FALLBACK_TITLE);
    }

    #[test]
    fn long_fields_are_truncated_on_char_boundaries() {
        let mut c = candidate();
        c.title = "è".repeat(600);
        c.summary = "à".repeat(4000);
        let p = to_posting(&c, &source());
        assert_eq!(p.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(p.abstract_text.chars().count(), MAX_ABSTRACT_CHARS);
    }
}
