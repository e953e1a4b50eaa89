//! Territorial-office discovery.
//!
//! Scans a seed authority's landing page for anchors whose text mentions a
//! territorial office (UST/ATP) and whose href is already absolute. Discovered
//! offices inherit the parent's region; province and municipality stay empty.

use std::time::Duration;

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use tracing::warn;

use super::{Source, SourceTier};
use crate::fetch::Fetcher;

const OFFICE_MARKERS: &[&str] = &["ufficio scolastico territoriale", "ust", "atp"];
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Discover territorial offices linked from a seed's landing page.
///
/// Any fetch or parse problem yields zero discoveries for this seed, never a
/// cycle abort.
pub async fn discover_territorial_offices(fetcher: &dyn Fetcher, seed: &Source) -> Vec<Source> {
    match fetch_and_scan(fetcher, seed).await {
        Ok(found) => found,
        Err(e) => {
            warn!(seed = %seed.name, error = ?e, "territorial office discovery failed");
            Vec::new()
        }
    }
}

async fn fetch_and_scan(fetcher: &dyn Fetcher, seed: &Source) -> Result<Vec<Source>> {
    let page = fetcher
        .get(&seed.base_url, FETCH_TIMEOUT)
        .await
        .context("fetching seed landing page")?;
    if page.status != 200 {
        return Ok(Vec::new());
    }
    Ok(scan_anchors(&page.body, seed))
}

/// Extract office sources from landing-page HTML. Pure so tests can feed
/// fixture pages.
pub fn scan_anchors(html: &str, seed: &Source) -> Vec<Source> {
    let document = Html::parse_document(html);
    let anchors = match Selector::parse("a") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut out = Vec::new();
    for el in document.select(&anchors) {
        let href = el.value().attr("href").unwrap_or_default();
        let text = el.text().collect::<Vec<_>>().join(" ");
        let folded = text.to_lowercase();
        if !href.starts_with("http") {
            continue;
        }
        if !OFFICE_MARKERS.iter().any(|k| folded.contains(k)) {
            continue;
        }
        let name = text.split_whitespace().collect::<Vec<_>>().join(" ");
        out.push(Source {
            name: if name.is_empty() { "UST".to_string() } else { name },
            base_url: href.to_string(),
            rss_url: None,
            regione: seed.regione.clone(),
            provincia: String::new(),
            comune: String::new(),
            tier: SourceTier::Ust,
        });
    }
    out
}
