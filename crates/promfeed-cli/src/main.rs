mod plan;
mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "promfeed")]
#[command(about = "Merge supplier XML feeds into chunked marketplace catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, validate, and merge feeds, then write gzip-compressed catalogs
    Run {
        #[command(flatten)]
        overrides: PlanArgs,
        /// Merge and report planned artifacts without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the resolved configuration and run plan, then exit
    Check {
        #[command(flatten)]
        overrides: PlanArgs,
    },
}

/// Command-line overrides applied on top of environment configuration.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct PlanArgs {
    /// Feed id to process; repeat for several. Replaces the feeds file list.
    #[arg(long = "feed", value_name = "ID")]
    pub feeds: Vec<String>,
    /// Read `<ID>.xml` files from this directory instead of the remote endpoint
    #[arg(long, value_name = "DIR")]
    pub feed_dir: Option<PathBuf>,
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Maximum offers per generated artifact
    #[arg(long, value_name = "N")]
    pub chunk_size: Option<usize>,
    /// Explicit output file name; repeat for several. Splits offers evenly
    /// across exactly these files.
    #[arg(long = "output", value_name = "FILE")]
    pub outputs: Vec<String>,
    /// Write empty catalogs when no offers survive validation
    #[arg(long)]
    pub emit_empty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = promfeed_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Run { overrides, dry_run } => {
            let plan = plan::resolve(config, &overrides)?;
            let summary = run::execute(&plan, dry_run).await?;
            tracing::info!(
                count = summary.offers,
                artifacts = summary.written.len(),
                "run finished"
            );
            Ok(())
        }
        Commands::Check { overrides } => {
            let plan = plan::resolve(config, &overrides)?;
            for line in plan.summary() {
                println!("{line}");
            }
            Ok(())
        }
    }
}
