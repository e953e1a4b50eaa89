//! Feed acquisition and parsing.
//!
//! An explicit feed URL on the source wins; otherwise conventional feed paths
//! are probed in declared order against the base URL, accepting the first 200
//! whose content-type or body prefix looks like a feed. Parsing is RSS via
//! quick-xml serde structs.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::fetch::Fetcher;
use crate::sources::Source;

use super::strip_html;

/// Conventional feed locations, probed in this order. The first hit wins;
/// later paths are not attempted and feeds are never merged.
pub const FEED_PATHS: &[&str] = &[
    "/feed",
    "/category/albo/feed",
    "/?feed=rss2",
    "/index.php/feed",
    "/rss",
];

const FEED_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// One parsed feed entry, summary already HTML-stripped.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
}

/// Obtain feed text for a source, or None if no strategy produced one.
pub async fn fetch_feed(fetcher: &dyn Fetcher, source: &Source) -> Option<String> {
    if let Some(rss_url) = &source.rss_url {
        // Explicit feed URL: any 200 response is taken as the feed.
        if let Ok(page) = fetcher.get(rss_url, FEED_TIMEOUT).await {
            if page.status == 200 {
                return Some(page.body);
            }
        }
    }
    probe_feed_paths(fetcher, &source.base_url).await
}

/// Probe conventional feed paths in order, stopping at the first feed-like
/// 200 response.
pub async fn probe_feed_paths(fetcher: &dyn Fetcher, base_url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    for path in FEED_PATHS {
        let url = format!("{base}{path}");
        let page = match fetcher.get(&url, FEED_TIMEOUT).await {
            Ok(p) => p,
            Err(_) => continue,
        };
        if page.status == 200 && looks_like_feed(&page.content_type, &page.body) {
            return Some(page.body);
        }
    }
    None
}

/// Feed sniff: xml content-type, or an "rss" signature in the body prefix.
pub fn looks_like_feed(content_type: &str, body: &str) -> bool {
    if content_type.contains("xml") {
        return true;
    }
    let prefix: String = body.chars().take(200).collect();
    prefix.to_lowercase().contains("rss")
}

/// Parse RSS text into entries. Items without a link are dropped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let scrubbed = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&scrubbed).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for item in rss.channel.item {
        let Some(link) = item.link else { continue };
        let link = link.trim().to_string();
        if link.is_empty() {
            continue;
        }
        out.push(FeedEntry {
            title: item.title.as_deref().unwrap_or_default().trim().to_string(),
            summary: strip_html(item.description.as_deref().unwrap_or_default()),
            published: item.pub_date.as_deref().and_then(parse_feed_date),
            link,
        });
    }
    Ok(out)
}

/// Parse a feed timestamp: RFC 2822 (RSS pubDate) first, RFC 3339 as a
/// fallback for feeds that emit it anyway.
fn parse_feed_date(ts: &str) -> Option<DateTime<Utc>> {
    let parsed = OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()?;
    let unix = parsed.to_offset(UtcOffset::UTC).unix_timestamp();
    DateTime::<Utc>::from_timestamp(unix, 0)
}

// Feeds in the wild embed bare HTML entities that are not valid XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_sniff_accepts_xml_content_type() {
        assert!(looks_like_feed("application/xml; charset=utf-8", ""));
        assert!(looks_like_feed("text/xml", "anything"));
    }

    #[test]
    fn feed_sniff_accepts_rss_body_prefix() {
        assert!(looks_like_feed(
            "text/html",
            r#"<?xml version="1.0"?><rss version="2.0">"#
        ));
        assert!(!looks_like_feed("text/html", "<html><body>home</body></html>"));
    }

    #[test]
    fn rfc2822_dates_parse() {
        let dt = parse_feed_date("Mon, 02 Jun 2025 08:30:00 +0200").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-02T06:30:00+00:00");
    }

    #[test]
    fn unparseable_dates_become_none() {
        assert!(parse_feed_date("ieri pomeriggio").is_none());
    }

    #[test]
    fn items_without_link_are_dropped() {
        let xml = r#"
            <rss version="2.0"><channel>
              <title>Albo</title>
              <item><title>Senza link</title></item>
              <item><title>Con link</title><link>https://x.example/a</link></item>
            </channel></rss>
        "#;
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://x.example/a");
    }
}
