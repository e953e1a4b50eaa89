//! Source directory construction.
//!
//! One cycle's crawl targets come from three tiers, in order: the fixed seed
//! list of regional authorities (USR), territorial offices (UST/ATP)
//! discovered on each seed's landing page, and the bulk school registry from
//! the ministry open-data CSV. The directory is an immutable value built
//! fresh per cycle; nothing here is persisted.

pub mod discovery;
pub mod registry;
pub mod seeds;

use std::path::Path;

use tracing::{info, warn};

use crate::fetch::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTier {
    /// Seed regional authority.
    Usr,
    /// Territorial office discovered on a seed's landing page.
    Ust,
    /// Individual school from the registry dataset.
    Scuola,
}

/// One crawl target for one cycle.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub base_url: String,
    pub rss_url: Option<String>,
    pub regione: String,
    pub provincia: String,
    pub comune: String,
    pub tier: SourceTier,
}

/// Build the full source directory for one cycle.
///
/// Seed-file problems fall back to the embedded seed list; a registry fetch
/// failure degrades the cycle to authorities only. Neither aborts the cycle.
pub async fn build_directory(fetcher: &dyn Fetcher, seeds_path: Option<&Path>) -> Vec<Source> {
    let mut sources = match seeds::load_seeds(seeds_path) {
        Ok(seeds) => seeds,
        Err(e) => {
            warn!(error = ?e, "seed file unusable, using embedded seed list");
            seeds::embedded_seeds()
        }
    };

    let seed_snapshot = sources.clone();
    for seed in &seed_snapshot {
        let mut found = discovery::discover_territorial_offices(fetcher, seed).await;
        sources.append(&mut found);
    }

    match registry::load_schools(fetcher).await {
        Ok(mut schools) => {
            info!(count = schools.len(), "school registry loaded");
            sources.append(&mut schools);
        }
        Err(e) => {
            warn!(error = ?e, "school registry unavailable, cycle runs with degraded coverage");
        }
    }

    sources
}
