//! Processing of all videos of a catalog.
//!
//! Each video that isn't cut yet gets a stage group: decoding and cutlist
//! acquisition run concurrently, the cut waits for both. Stage groups of
//! different videos run in parallel, at most `max_parallel` at a time.
//! A run finishes when every stage group has finished; failures only
//! affect the result of their own video.

mod context;
mod gate;
mod stages;

pub use context::RunContext;
pub use gate::{DecodeReport, JoinGate, Joined, StageSignal, FAN_IN};

use crate::catalog::Catalog;
use gool_common::{Item, ItemResult, VideoStatus};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Process every video of `catalog` that isn't cut yet and record the outcomes.
pub async fn process(ctx: Arc<RunContext>, catalog: &mut Catalog) {
    let pending: Vec<Item> = catalog
        .items()
        .filter(|item| item.status != VideoStatus::Cut)
        .cloned()
        .collect();
    if pending.is_empty() {
        tracing::info!("Nothing to do");
        return;
    }
    tracing::info!("Processing {} videos", pending.len());

    let limit = Arc::new(Semaphore::new(ctx.max_parallel));
    let mut groups = Vec::with_capacity(pending.len());

    for item in pending {
        let key = item.key.clone();
        let ctx = Arc::clone(&ctx);
        let limit = Arc::clone(&limit);
        let group = tokio::spawn(async move {
            let _permit = limit.acquire_owned().await.ok();
            run_group(ctx, item).await
        });
        groups.push((key, group));
    }

    for (key, group) in groups {
        match group.await {
            Ok(item) => catalog.update(item),
            Err(e) => {
                tracing::error!("Processing of {} aborted: {}", key, e);
                if let Some(item) = catalog.get(&key) {
                    let mut item = item.clone();
                    item.result = ItemResult::Error(format!("processing aborted: {e}"));
                    catalog.update(item);
                }
            }
        }
    }

    ctx.progress.clear();
}

/// Decode and acquire concurrently, then cut.
async fn run_group(ctx: Arc<RunContext>, item: Item) -> Item {
    let (gate, decode_tx) = JoinGate::new();
    let acquire_tx = decode_tx.clone();

    {
        let ctx = Arc::clone(&ctx);
        let item = item.clone();
        tokio::spawn(async move {
            let report = stages::decode(&ctx, &item).await;
            if decode_tx.send(StageSignal::Decode(report)).await.is_err() {
                tracing::warn!("Cut stage of {} is gone", item.key);
            }
        });
    }

    {
        let ctx = Arc::clone(&ctx);
        let item = item.clone();
        tokio::spawn(async move {
            let outcome = stages::acquire(&ctx, &item).await;
            if acquire_tx.send(StageSignal::Acquire(outcome)).await.is_err() {
                tracing::warn!("Cut stage of {} is gone", item.key);
            }
        });
    }

    stages::apply(&ctx, item, gate).await
}
