//! soundmoji CLI
//!
//! Classifies audio-summary chunks from a precomputed score table and renders
//! the winning labels as an emoji bar chart or GIF animation.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use soundmoji::config::Config;
use soundmoji::services::chunk_extractor::parse_timestamp;
use soundmoji::{run_pipeline, PrecomputedTagger, RenderMode};

#[derive(Parser, Debug)]
#[command(
    name = "soundmoji",
    version,
    about = "Render audio-summary tagging results as emoji charts and animations"
)]
struct Cli {
    /// Audio file holding the summary recording
    #[arg(long)]
    audio: PathBuf,

    /// Metadata CSV with summary_start/summary_end columns
    #[arg(long)]
    metadata: PathBuf,

    /// JSON score table produced by the external tagging model
    #[arg(long)]
    scores: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output mode (overrides the config file)
    #[arg(long, value_enum)]
    mode: Option<RenderMode>,

    /// Output file path (overrides the config file)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Reference instant for chunk offsets; defaults to the first row's
    /// start timestamp truncated to whole seconds
    #[arg(long)]
    reference: Option<String>,

    /// Labels per frame in diagonal mode (overrides the config file)
    #[arg(long)]
    top: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("soundmoji {}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(mode) = cli.mode {
        config.render.mode = mode;
    }
    if let Some(output) = cli.output {
        config.render.output = output;
    }
    if let Some(top) = cli.top {
        config.render.diagonal_labels = top;
    }
    config.validate()?;

    let reference = cli
        .reference
        .as_deref()
        .map(parse_timestamp)
        .transpose()
        .context("invalid --reference timestamp")?;

    let mut tagger = PrecomputedTagger::from_path(&cli.scores)
        .with_context(|| format!("loading score table {}", cli.scores.display()))?;

    let output = run_pipeline(&config, &cli.audio, &cli.metadata, &mut tagger, reference)
        .context("pipeline failed")?;

    info!("Wrote {}", output.display());
    Ok(())
}
