//! Crawl orchestration.
//!
//! One cycle: build the source directory, fan retrieval out over a bounded
//! set of workers, upsert everything, then run the closure refresher once.
//! Cycles repeat forever with a configurable sleep in between; ctrl-c is
//! honored between cycles and abandons in-flight per-source work (a single
//! upsert is atomic, so nothing is left half-written).

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::normalize;
use crate::refresh;
use crate::retrieve;
use crate::sources::{self, Source};
use crate::store::PostingStore;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_candidates_total",
            "Raw candidates retrieved across all sources."
        );
        describe_counter!("ingest_source_errors_total", "Per-source retrieval errors.");
        describe_counter!("ingest_upsert_errors_total", "Posting upserts that failed.");
        describe_counter!("refresh_closed_total", "Postings closed by the refresher.");
        describe_counter!("crawl_cycles_total", "Completed crawl cycles.");
        describe_gauge!("crawl_sources_total", "Sources in the current directory.");
        describe_gauge!("crawl_last_cycle_ts", "Unix ts when the last cycle finished.");
    });
}

pub struct Orchestrator<S> {
    config: Config,
    store: Arc<S>,
    fetcher: Arc<dyn Fetcher>,
}

impl<S: PostingStore + 'static> Orchestrator<S> {
    pub fn new(config: Config, store: S) -> Result<Self> {
        Ok(Self {
            config,
            store: Arc::new(store),
            fetcher: Arc::new(HttpFetcher::new()?),
        })
    }

    /// Run cycles until shutdown. Never returns under normal operation.
    pub async fn run(self) -> Result<()> {
        ensure_metrics_described();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received, abandoning cycle");
                    return Ok(());
                }
                _ = self.run_cycle() => {}
            }
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }

    async fn run_cycle(&self) {
        let started = Instant::now();
        let sources =
            sources::build_directory(self.fetcher.as_ref(), self.config.seeds_path.as_deref())
                .await;
        info!(total = sources.len(), "source directory built");
        gauge!("crawl_sources_total").set(sources.len() as f64);

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_sources));
        let mut tasks = JoinSet::new();
        for source in sources {
            let semaphore = semaphore.clone();
            let store = self.store.clone();
            let fetcher = self.fetcher.clone();
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return,
                };
                ingest_source(fetcher.as_ref(), store.as_ref(), &source).await;
            });
        }
        while tasks.join_next().await.is_some() {}

        match refresh::refresh_closures(
            self.store.as_ref(),
            self.fetcher.as_ref(),
            Utc::now().date_naive(),
        )
        .await
        {
            Ok(closed) => info!(closed, "closure refresh finished"),
            Err(e) => warn!(error = ?e, "closure refresh failed"),
        }

        counter!("crawl_cycles_total").increment(1);
        gauge!("crawl_last_cycle_ts").set(Utc::now().timestamp().max(0) as f64);
        info!(elapsed_s = started.elapsed().as_secs(), "cycle finished");
    }
}

/// Retrieve one source and upsert its candidates. All failures stay local to
/// the source or the single posting.
pub async fn ingest_source(fetcher: &dyn Fetcher, store: &dyn PostingStore, source: &Source) {
    let candidates = retrieve::retrieve_source(fetcher, source).await;
    if candidates.is_empty() {
        return;
    }
    debug!(source = %source.name, count = candidates.len(), "ingesting candidates");
    for candidate in &candidates {
        let posting = normalize::to_posting(candidate, source);
        if let Err(e) = store.upsert(&posting).await {
            warn!(url = %posting.url, error = ?e, "upsert failed");
            counter!("ingest_upsert_errors_total").increment(1);
        }
    }
}
