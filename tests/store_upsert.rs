// tests/store_upsert.rs
// Upsert-by-URL semantics against the in-memory store.

use chrono::Utc;
use interpelli_ingest::store::memory::MemStore;
use interpelli_ingest::store::{CloseReason, NewPosting, PostingStore};

fn posting(url: &str, title: &str) -> NewPosting {
    NewPosting {
        source_name: "IC Leopardi".into(),
        source_url: "https://icleopardi.edu.it".into(),
        url: url.into(),
        title: title.into(),
        abstract_text: String::new(),
        regione: "Marche".into(),
        provincia: "AN".into(),
        comune: "Ancona".into(),
        scuola: "IC Leopardi".into(),
        classe: None,
        categorie: vec!["interpello".into()],
        is_open: true,
        scadenza: None,
        pubblicato_il: None,
        allegati: Vec::new(),
    }
}

#[tokio::test]
async fn same_url_twice_keeps_one_row_with_second_title() {
    let store = MemStore::new();
    store
        .upsert(&posting("https://x.example/albo/1", "Primo titolo"))
        .await
        .unwrap();
    let first_id = store.get("https://x.example/albo/1").unwrap().id;

    store
        .upsert(&posting("https://x.example/albo/1", "Titolo corretto"))
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    let row = store.get("https://x.example/albo/1").unwrap();
    assert_eq!(row.id, first_id);
    assert_eq!(row.data.title, "Titolo corretto");
}

#[tokio::test]
async fn distinct_urls_create_distinct_rows() {
    let store = MemStore::new();
    store
        .upsert(&posting("https://x.example/albo/1", "Uno"))
        .await
        .unwrap();
    store
        .upsert(&posting("https://x.example/albo/2", "Due"))
        .await
        .unwrap();
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn heuristic_reingest_does_not_reopen_authoritative_closure() {
    let store = MemStore::new();
    store
        .upsert(&posting("https://x.example/albo/1", "Interpello"))
        .await
        .unwrap();
    let id = store.get("https://x.example/albo/1").unwrap().id;

    store
        .mark_closed(id, CloseReason::NotFound, Utc::now())
        .await
        .unwrap();

    // A later crawl still sees the posting text as open.
    store
        .upsert(&posting("https://x.example/albo/1", "Interpello"))
        .await
        .unwrap();

    let row = store.get("https://x.example/albo/1").unwrap();
    assert!(!row.data.is_open, "refresher closure must stick");
    assert_eq!(row.closed_reason.as_deref(), Some("not-found"));
}

#[tokio::test]
async fn heuristic_closure_can_flip_back_open() {
    let store = MemStore::new();
    let mut closed = posting("https://x.example/albo/9", "Esito pubblicato");
    closed.is_open = false;
    store.upsert(&closed).await.unwrap();

    // No closed_reason was ever set, so the latest heuristic wins.
    store
        .upsert(&posting("https://x.example/albo/9", "Riaperto"))
        .await
        .unwrap();

    assert!(store.get("https://x.example/albo/9").unwrap().data.is_open);
}

#[tokio::test]
async fn open_postings_lists_only_open_rows() {
    let store = MemStore::new();
    store
        .upsert(&posting("https://x.example/a", "A"))
        .await
        .unwrap();
    let mut b = posting("https://x.example/b", "B");
    b.is_open = false;
    store.upsert(&b).await.unwrap();

    let open = store.open_postings().await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].url, "https://x.example/a");
}
