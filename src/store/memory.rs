//! In-memory store used by tests.
//!
//! Mirrors the Postgres upsert semantics, including the closed-state guard,
//! so pipeline behavior can be exercised without a database. Data is lost on
//! drop; not for production.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CloseReason, NewPosting, OpenPosting, PostingStore};

#[derive(Debug, Clone)]
pub struct StoredPosting {
    pub id: i64,
    pub data: NewPosting,
    pub closed_reason: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemStore {
    rows: RwLock<HashMap<String, StoredPosting>>,
    next_id: AtomicI64,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn get(&self, url: &str) -> Option<StoredPosting> {
        self.rows.read().unwrap().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed a row directly, bypassing upsert semantics. Test setup helper.
    pub fn insert_raw(&self, row: StoredPosting) {
        self.rows.write().unwrap().insert(row.data.url.clone(), row);
    }
}

#[async_trait]
impl PostingStore for MemStore {
    async fn upsert(&self, posting: &NewPosting) -> Result<()> {
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&posting.url) {
            Some(existing) => {
                // Same column set the SQL upsert touches; id, source fields
                // and location stay as first seen.
                existing.data.title = posting.title.clone();
                existing.data.abstract_text = posting.abstract_text.clone();
                existing.data.categorie = posting.categorie.clone();
                existing.data.scadenza = posting.scadenza;
                existing.data.pubblicato_il = posting.pubblicato_il;
                if existing.closed_reason.is_none() {
                    existing.data.is_open = posting.is_open;
                }
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                rows.insert(
                    posting.url.clone(),
                    StoredPosting {
                        id,
                        data: posting.clone(),
                        closed_reason: None,
                        closed_at: None,
                    },
                );
            }
        }
        Ok(())
    }

    async fn open_postings(&self) -> Result<Vec<OpenPosting>> {
        let rows = self.rows.read().unwrap();
        let mut open: Vec<OpenPosting> = rows
            .values()
            .filter(|r| r.data.is_open)
            .map(|r| OpenPosting {
                id: r.id,
                url: r.data.url.clone(),
                scadenza: r.data.scadenza,
            })
            .collect();
        open.sort_by_key(|p| p.id);
        Ok(open)
    }

    async fn mark_closed(&self, id: i64, reason: CloseReason, when: DateTime<Utc>) -> Result<()> {
        let mut rows = self.rows.write().unwrap();
        for row in rows.values_mut() {
            if row.id == id {
                row.data.is_open = false;
                row.closed_reason = Some(reason.as_str().to_string());
                row.closed_at = Some(when);
                break;
            }
        }
        Ok(())
    }
}
