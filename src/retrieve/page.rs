//! Link-scrape fallback.
//!
//! When no feed is available the base page itself is fetched and every anchor
//! is classified on link text + href. Only anchors that earn at least one
//! real (non-sentinel) category survive, which keeps navigation chrome out of
//! the store. Relative hrefs are resolved against the base URL.

use std::time::Duration;

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use url::Url;

use super::{RawCandidate, MAX_PAGE_LINKS};
use crate::classify;
use crate::fetch::Fetcher;
use crate::sources::Source;

const PAGE_TIMEOUT: Duration = Duration::from_secs(20);

pub async fn scrape_links(fetcher: &dyn Fetcher, source: &Source) -> Result<Vec<RawCandidate>> {
    let page = fetcher
        .get(&source.base_url, PAGE_TIMEOUT)
        .await
        .context("fetching base page")?;
    if page.status != 200 {
        return Ok(Vec::new());
    }
    Ok(extract_candidates(&page.body, &source.base_url))
}

/// Extract classified link candidates from page HTML. Pure so tests can feed
/// fixture pages.
pub fn extract_candidates(html: &str, base_url: &str) -> Vec<RawCandidate> {
    let document = Html::parse_document(html);
    let anchors = match Selector::parse("a") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    let base = Url::parse(base_url).ok();

    let mut out = Vec::new();
    for el in document.select(&anchors) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if href.trim().is_empty() {
            continue;
        }
        let text = el.text().collect::<Vec<_>>().join(" ");
        let combined = format!("{} {}", text, href);
        let categorie = classify::extract_categories(&combined);
        if !classify::has_real_category(&categorie) {
            continue;
        }
        out.push(RawCandidate {
            url: resolve_href(base.as_ref(), base_url, href),
            title: text.split_whitespace().collect::<Vec<_>>().join(" "),
            summary: String::new(),
            published: None,
            is_open: !classify::is_closed_text(&combined),
            categorie,
        });
        if out.len() >= MAX_PAGE_LINKS {
            break;
        }
    }
    out
}

fn resolve_href(base: Option<&Url>, base_url: &str, href: &str) -> String {
    if let Some(b) = base {
        if let Ok(joined) = b.join(href) {
            return joined.to_string();
        }
    }
    // Base did not parse: keep absolute hrefs, root relative ones manually.
    if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        href.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_hrefs_resolve_against_base() {
        let base = Url::parse("https://scuola.example").ok();
        assert_eq!(
            resolve_href(base.as_ref(), "https://scuola.example", "/albo/123"),
            "https://scuola.example/albo/123"
        );
        assert_eq!(
            resolve_href(base.as_ref(), "https://scuola.example", "https://altro.example/x"),
            "https://altro.example/x"
        );
    }

    #[test]
    fn navigation_links_are_filtered_out() {
        let html = r#"
            <nav><a href="/chi-siamo">Chi siamo</a><a href="/contatti">Contatti</a></nav>
            <main><a href="/albo/55">Interpello per supplenza breve</a></main>
        "#;
        let found = extract_candidates(html, "https://scuola.example");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://scuola.example/albo/55");
        assert_eq!(found[0].title, "Interpello per supplenza breve");
    }

    #[test]
    fn candidate_count_is_capped() {
        let mut html = String::new();
        for i in 0..40 {
            html.push_str(&format!(r#"<a href="/albo/{i}">Bando {i}</a>"#));
        }
        let found = extract_candidates(&html, "https://scuola.example");
        assert_eq!(found.len(), MAX_PAGE_LINKS);
    }
}
