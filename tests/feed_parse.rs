// tests/feed_parse.rs
// RSS fixture parsing: titles, links, stripped summaries, timestamps.

use interpelli_ingest::retrieve::feed::parse_feed;

const ALBO_XML: &str = include_str!("fixtures/albo_rss.xml");

#[test]
fn fixture_feed_parses_all_items() {
    let entries = parse_feed(ALBO_XML).unwrap();
    assert_eq!(entries.len(), 3);

    let first = &entries[0];
    assert_eq!(
        first.title,
        "Interpello nazionale per supplenza classe di concorso A-22"
    );
    assert_eq!(first.link, "https://icleopardi.edu.it/albo/interpello-a22");
    assert!(first.summary.contains("supplenza breve"));
    assert!(
        !first.summary.contains('<'),
        "summary must be HTML-stripped: {}",
        first.summary
    );
    let published = first.published.expect("pubDate parses");
    assert_eq!(published.to_rfc3339(), "2025-06-02T06:30:00+00:00");
}

#[test]
fn malformed_xml_is_an_error_not_a_panic() {
    assert!(parse_feed("questo non è xml").is_err());
}
