//! Resolution of the run plan: configuration plus command-line overrides,
//! the feed list, and the output layout.

use anyhow::Context;
use promfeed_core::{
    load_feeds, validate_feed_ids, validate_output_files, AppConfig, FeedSourceConfig,
};
use promfeed_export::OutputPlan;

use crate::PlanArgs;

/// Everything a run needs, validated before any feed is fetched.
#[derive(Debug, Clone)]
pub(crate) struct RunPlan {
    pub config: AppConfig,
    pub feed_ids: Vec<String>,
    pub output: OutputPlan,
}

impl RunPlan {
    /// Human-readable description printed by `promfeed check`.
    pub(crate) fn summary(&self) -> Vec<String> {
        let c = &self.config;
        let mut lines = vec![
            format!("feeds:               {}", self.feed_ids.join(", ")),
            format!("source:              {}", c.feed_source),
            format!("output dir:          {}", c.output_dir.display()),
            format!("partition:           {}", self.output.policy()),
            format!("availability policy: {}", c.availability_policy),
            format!("dedup key:           {}", c.dedup_key),
            format!("emit empty:          {}", c.emit_empty),
            format!("concurrent fetches:  {}", c.max_concurrent_fetches),
        ];
        if let Some(dir) = &c.cache_dir {
            lines.push(format!("raw feed cache:      {}", dir.display()));
        }
        lines
    }
}

/// Applies `args` to `config` and resolves the feed list.
///
/// Feed ids come from `--feed`, else `PROMFEED_FEED_IDS`, else the feeds file.
/// Output names come from `--output`, else `PROMFEED_OUTPUT_FILES`, else the
/// feeds file's `outputs` (only when the feed list was read from that file).
pub(crate) fn resolve(mut config: AppConfig, args: &PlanArgs) -> anyhow::Result<RunPlan> {
    if let Some(dir) = &args.feed_dir {
        config.feed_source = FeedSourceConfig::Local { dir: dir.clone() };
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if let Some(size) = args.chunk_size {
        if size == 0 {
            anyhow::bail!("--chunk-size must be greater than zero");
        }
        config.chunk_size = size;
    }
    config.emit_empty |= args.emit_empty;

    let (feed_ids, file_outputs) = if !args.feeds.is_empty() {
        (args.feeds.clone(), None)
    } else if let Some(ids) = &config.feed_ids {
        (ids.clone(), None)
    } else {
        let file = load_feeds(&config.feeds_path).with_context(|| {
            format!(
                "no feed ids given; failed to load {}",
                config.feeds_path.display()
            )
        })?;
        (file.feeds, file.outputs)
    };
    validate_feed_ids(&feed_ids)?;

    let outputs = if args.outputs.is_empty() {
        config.output_files.clone().or(file_outputs)
    } else {
        Some(args.outputs.clone())
    };
    if let Some(names) = &outputs {
        validate_output_files(names)?;
    }
    config.output_files = outputs;

    let output = OutputPlan::from_app_config(&config);
    Ok(RunPlan {
        config,
        feed_ids,
        output,
    })
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
