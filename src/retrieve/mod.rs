//! Per-source content retrieval.
//!
//! Strategy chain, first success wins: explicit feed URL, then conventional
//! feed paths probed in order, then a plain scrape of the base page's
//! anchors. Every failure is contained at source granularity and degrades to
//! an empty candidate list.

pub mod feed;
pub mod page;

use chrono::{DateTime, Utc};
use metrics::counter;
use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::warn;

use crate::classify;
use crate::fetch::Fetcher;
use crate::sources::Source;

/// Cap on feed-derived candidates per source.
pub const MAX_FEED_ITEMS: usize = 30;
/// Cap on link-scrape candidates per source.
pub const MAX_PAGE_LINKS: usize = 25;

/// One unnormalized extraction result, paired with its Source downstream.
#[derive(Debug, Clone)]
pub struct RawCandidate {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    pub categorie: Vec<String>,
    pub is_open: bool,
}

/// Retrieve candidates for one source. Never fails; errors degrade to empty.
pub async fn retrieve_source(fetcher: &dyn Fetcher, source: &Source) -> Vec<RawCandidate> {
    match fetch_candidates(fetcher, source).await {
        Ok(items) => {
            counter!("ingest_candidates_total").increment(items.len() as u64);
            items
        }
        Err(e) => {
            warn!(source = %source.name, error = ?e, "retrieval failed");
            counter!("ingest_source_errors_total").increment(1);
            Vec::new()
        }
    }
}

async fn fetch_candidates(
    fetcher: &dyn Fetcher,
    source: &Source,
) -> anyhow::Result<Vec<RawCandidate>> {
    if let Some(xml) = feed::fetch_feed(fetcher, source).await {
        // A feed was obtained: it is the sole strategy, even if it turns out
        // to hold nothing usable.
        let entries = feed::parse_feed(&xml)?;
        let items = entries
            .into_iter()
            .take(MAX_FEED_ITEMS)
            .map(|entry| {
                let text = format!("{} {}", entry.title, entry.summary);
                RawCandidate {
                    url: entry.link,
                    title: entry.title,
                    summary: entry.summary,
                    published: entry.published,
                    categorie: classify::extract_categories(&text),
                    is_open: !classify::is_closed_text(&text),
                }
            })
            .collect();
        return Ok(items);
    }
    page::scrape_links(fetcher, source).await
}

/// Strip tags and entities from feed HTML fragments, collapsing whitespace.
pub fn strip_html(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    let stripped = re_tags.replace_all(&decoded, " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_removes_tags_and_entities() {
        let s = "<p>Avviso&nbsp;di <b>interpello</b></p>";
        assert_eq!(strip_html(s), "Avviso di interpello");
    }

    #[test]
    fn strip_html_collapses_whitespace() {
        assert_eq!(strip_html("  a \n\t b  "), "a b");
    }
}
