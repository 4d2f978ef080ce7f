//! Cutlist acquisition.
//!
//! A recording usually has several community-made cutlists. They are listed
//! by rating, then tried in that order until one parses completely. The
//! first usable cutlist wins even if a better rated one exists but is
//! malformed.

mod client;
mod detail;
mod headers;

pub use client::CutlistClient;
pub use detail::{decode_document, parse_cutlist};
pub use headers::{parse_headers, rank_headers};

use gool_common::{CandidateHeader, CutSpec, Item, Result};

/// Where cutlists come from.
#[async_trait::async_trait]
pub trait CutlistSource: Send + Sync {
    /// Candidates for a recording, best rated first.
    ///
    /// Equal ratings keep the server's order. Any failure yields an empty list.
    async fn fetch_headers(&self, lookup_name: &str) -> Vec<CandidateHeader>;

    /// The raw INI text of one candidate.
    async fn fetch_document(&self, id: &str) -> Result<String>;
}

/// Try the candidates in the given order and return the first usable cutlist.
pub async fn fetch_detail(source: &dyn CutlistSource, ids: &[String]) -> Option<CutSpec> {
    for id in ids {
        let text = match source.fetch_document(id).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping cutlist {}: {}", id, e);
                continue;
            }
        };

        match parse_cutlist(id, &text) {
            Ok(spec) => {
                tracing::debug!("Using cutlist {} with {} cuts", id, spec.segments.len());
                return Some(spec);
            }
            Err(e) => tracing::warn!("Skipping cutlist: {}", e),
        }
    }
    None
}

/// Acquire a cutlist for an item: list candidates, then select the first usable one.
pub async fn acquire(source: &dyn CutlistSource, item: &Item) -> Option<CutSpec> {
    let headers = source.fetch_headers(&item.lookup_name()).await;
    if headers.is_empty() {
        tracing::info!("No cutlist available for {}", item.key);
        return None;
    }

    let ids: Vec<String> = headers.into_iter().map(|h| h.id).collect();
    let spec = fetch_detail(source, &ids).await;
    if spec.is_none() {
        tracing::error!("None of the {} cutlists for {} is usable", ids.len(), item.key);
    }
    spec
}

/// Whether the server lists at least one cutlist for the item.
pub async fn has_cutlists(source: &dyn CutlistSource, item: &Item) -> bool {
    !source.fetch_headers(&item.lookup_name()).await.is_empty()
}
