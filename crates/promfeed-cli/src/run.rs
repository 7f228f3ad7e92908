//! The `run` command: fetch → validate → merge → partition → write.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use promfeed_core::ValidatedOffer;
use promfeed_export::{partition, render_chunk, write_gzip_atomic, ExportError};
use promfeed_ingest::{FeedClient, MergedCatalog, OfferMerger};

use crate::plan::RunPlan;

/// What a completed run produced.
#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    pub offers: usize,
    pub written: Vec<PathBuf>,
}

/// Executes one run.
///
/// Feed failures are logged and skipped. Artifact write failures do not stop
/// the remaining artifacts, but make the run return an error at the end.
pub(crate) async fn execute(plan: &RunPlan, dry_run: bool) -> anyhow::Result<RunSummary> {
    let config = &plan.config;

    if !dry_run {
        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                config.output_dir.display()
            )
        })?;
    }

    let client = FeedClient::from_app_config(config)?;
    tracing::info!(
        feeds = plan.feed_ids.len(),
        source = %config.feed_source,
        partition = %plan.output.policy(),
        dry_run,
        "starting run"
    );

    let catalog = merge_feeds(plan, &client).await;
    tracing::info!(
        count = catalog.offers.len(),
        rejected = catalog.rejected(),
        duplicates = catalog.duplicates,
        failed_feeds = catalog.failed_feeds(),
        "merge complete"
    );

    let mut summary = RunSummary {
        offers: catalog.offers.len(),
        written: Vec::new(),
    };

    if catalog.offers.is_empty() && !config.emit_empty {
        tracing::warn!("no valid offers after merge; no artifacts written");
        return Ok(summary);
    }

    let parts = partition(&catalog.offers, &plan.output.policy())?;
    let names = plan.output.file_names(parts.len());

    if dry_run {
        for (name, part) in names.iter().zip(&parts) {
            tracing::info!(file = %name, count = part.len(), "dry run: would write artifact");
        }
        return Ok(summary);
    }

    let generated_at = Utc::now();
    let mut failed = 0usize;
    for (name, part) in names.iter().zip(&parts) {
        match write_artifact(&config.output_dir, name, part, generated_at) {
            Ok(path) => {
                tracing::info!(path = %path.display(), count = part.len(), "artifact written");
                summary.written.push(path);
            }
            Err(e) => {
                failed += 1;
                tracing::error!(file = %name, error = %e, "failed to write artifact");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} artifacts could not be written", parts.len());
    }
    Ok(summary)
}

/// Fetches feeds with bounded concurrency. `buffered` yields results in
/// feed-list order, so merge order never depends on which fetch finishes first.
async fn merge_feeds(plan: &RunPlan, client: &FeedClient) -> MergedCatalog {
    let config = &plan.config;
    let mut merger = OfferMerger::new(config.availability_policy, config.dedup_key);

    let mut fetches = stream::iter(&plan.feed_ids)
        .map(|feed_id| async move { (feed_id, client.fetch_document(feed_id).await) })
        .buffered(config.max_concurrent_fetches.max(1));

    while let Some((feed_id, fetched)) = fetches.next().await {
        merger.ingest(feed_id, fetched);
    }
    merger.finish()
}

fn write_artifact(
    dir: &Path,
    name: &str,
    offers: &[ValidatedOffer],
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let chunk = render_chunk(offers, generated_at)?;
    tracing::debug!(file = name, digest = %chunk.content_digest, "rendered chunk");
    write_gzip_atomic(dir, name, &chunk.xml)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
