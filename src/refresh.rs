//! Closure refresher.
//!
//! Runs once per cycle after ingestion and is the only component that closes
//! postings authoritatively: by expired deadline, or by a liveness probe that
//! reports the posting URL gone. Anything short of a positive closure signal
//! (success, timeout, transport error, non-404 status) leaves the posting
//! open. The transition is one-way; reopening never happens here.

use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use metrics::counter;
use tracing::{debug, warn};

use crate::fetch::Fetcher;
use crate::store::{CloseReason, PostingStore};

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Re-evaluate every open posting; returns how many were closed.
pub async fn refresh_closures(
    store: &dyn PostingStore,
    fetcher: &dyn Fetcher,
    today: NaiveDate,
) -> Result<usize> {
    let open = store.open_postings().await?;
    let mut closed = 0usize;

    for posting in open {
        let reason = match posting.scadenza {
            Some(deadline) if deadline < today => Some(CloseReason::DeadlinePassed),
            _ => match fetcher.head_status(&posting.url, PROBE_TIMEOUT).await {
                Ok(404) => Some(CloseReason::NotFound),
                Ok(_) | Err(_) => None,
            },
        };

        let Some(reason) = reason else { continue };
        if let Err(e) = store.mark_closed(posting.id, reason, Utc::now()).await {
            warn!(id = posting.id, error = ?e, "failed to mark posting closed");
            continue;
        }
        debug!(id = posting.id, reason = reason.as_str(), "posting closed");
        counter!("refresh_closed_total").increment(1);
        closed += 1;
    }

    Ok(closed)
}
