//! Posting persistence.
//!
//! The `interpello` table is the only cross-cycle state. Its URL uniqueness
//! constraint backs the upsert contract: re-ingesting a URL updates the row
//! in place, it never duplicates. Postings are never deleted here.
//!
//! One deliberate asymmetry: a row closed by the refresher carries a
//! `closed_reason`, and a later heuristic upsert must not reopen it. Rows
//! closed only by the ingest heuristic have no reason and follow the latest
//! crawl.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Canonical posting shape as produced by the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPosting {
    pub source_name: String,
    pub source_url: String,
    pub url: String,
    pub title: String,
    pub abstract_text: String,
    pub regione: String,
    pub provincia: String,
    pub comune: String,
    pub scuola: String,
    pub classe: Option<String>,
    pub categorie: Vec<String>,
    pub is_open: bool,
    pub scadenza: Option<NaiveDate>,
    pub pubblicato_il: Option<DateTime<Utc>>,
    pub allegati: Vec<String>,
}

/// Projection used by the closure refresher.
#[derive(Debug, Clone)]
pub struct OpenPosting {
    pub id: i64,
    pub url: String,
    pub scadenza: Option<NaiveDate>,
}

/// Why the refresher closed a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    DeadlinePassed,
    NotFound,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::DeadlinePassed => "deadline-passed",
            CloseReason::NotFound => "not-found",
        }
    }
}

#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Insert or update by URL. Title, abstract, categories, deadline,
    /// publish timestamp and open state are overwritten; id and source URL
    /// are stable; an authoritative closed state is preserved.
    async fn upsert(&self, posting: &NewPosting) -> Result<()>;

    /// All currently-open postings.
    async fn open_postings(&self) -> Result<Vec<OpenPosting>>;

    /// One-way open→closed transition with reason and timestamp.
    async fn mark_closed(&self, id: i64, reason: CloseReason, when: DateTime<Utc>) -> Result<()>;
}
