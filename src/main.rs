//! paper-reconcile - Multi-source bibliographic record reconciliation
//!
//! Reads source responses fetched from several citation databases and
//! writes one deduplicated record per paper.
//!
//! ## Usage
//!
//! ```bash
//! paper-reconcile reconcile responses.json --output merged.json
//! paper-reconcile compare a.json b.json
//! paper-reconcile weights show
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use futures::future;
use paper_reconcile::{
    by_title, compare, reconcile, response::load_responses, ComparisonWeights, Paper, WeightsStore,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Multi-source bibliographic record reconciliation
#[derive(Parser)]
#[command(name = "paper-reconcile")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a JSON array of source responses
    Reconcile {
        /// Input file: JSON array of {paper, citations, references}
        input: PathBuf,

        /// Weights file (defaults to the stored weight vector)
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// Output file (default: ./reconciled_<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the score breakdown for two paper records
    Compare {
        /// First paper (JSON)
        first: PathBuf,

        /// Second paper (JSON)
        second: PathBuf,

        /// Weights file (defaults to the stored weight vector)
        #[arg(short, long)]
        weights: Option<PathBuf>,
    },

    /// Manage the stored comparison weights
    Weights {
        #[command(subcommand)]
        action: WeightsAction,
    },
}

#[derive(Subcommand)]
enum WeightsAction {
    /// Print the effective weight vector
    Show,
    /// Show weights file path
    Path,
    /// Write the default weight vector to the weights file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Reconcile {
            input,
            weights,
            output,
        } => run_reconcile(input, weights, output).await,
        Commands::Compare {
            first,
            second,
            weights,
        } => run_compare(&first, &second, weights),
        Commands::Weights { action } => handle_weights(action),
    }
}

/// Weights from an explicit file, or from the store
fn resolve_weights(path: Option<PathBuf>) -> Result<ComparisonWeights> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read weights file {}", path.display()))?;
            ComparisonWeights::from_json(&content)
                .with_context(|| format!("Invalid weights file {}", path.display()))
        }
        None => Ok(WeightsStore::new()?.load().context("Failed to load stored weights")?),
    }
}

// ============================================================================
// Reconcile
// ============================================================================

async fn run_reconcile(
    input: PathBuf,
    weights: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let weights = resolve_weights(weights)?;

    let decoded = load_responses(&input)
        .with_context(|| format!("Failed to load source responses from {}", input.display()))?;
    println!("Loaded {} source responses from {}", decoded.len(), input.display());

    let pending: Vec<_> = decoded.into_iter().map(future::ready).collect();
    let mut reconciled = reconcile(pending, &weights).await?;
    reconciled.sort_by(by_title);

    let output = output.unwrap_or_else(|| {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        PathBuf::from(format!("reconciled_{}.json", timestamp))
    });

    let content = serde_json::to_string_pretty(&reconciled).context("Failed to serialize results")?;
    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(papers = reconciled.len(), output = %output.display(), "Wrote reconciled records");
    println!("Reconciled into {} papers: {}", reconciled.len(), output.display());
    Ok(())
}

// ============================================================================
// Compare
// ============================================================================

fn load_paper(path: &Path) -> Result<Paper> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid paper record in {}", path.display()))
}

fn run_compare(first: &Path, second: &Path, weights: Option<PathBuf>) -> Result<()> {
    let weights = resolve_weights(weights)?;
    let a = load_paper(first)?;
    let b = load_paper(second)?;

    let comparison = compare(&a, &b, &weights);
    println!("{}", serde_json::to_string_pretty(&comparison)?);
    println!(
        "{}",
        if comparison.is_match() {
            "=> same paper"
        } else {
            "=> different papers"
        }
    );
    Ok(())
}

// ============================================================================
// Weights Management
// ============================================================================

fn handle_weights(action: WeightsAction) -> Result<()> {
    let store = WeightsStore::new()?;

    match action {
        WeightsAction::Show => {
            let weights = store.load()?;
            println!("{}", serde_json::to_string_pretty(&weights)?);
        }
        WeightsAction::Path => {
            println!("Weights file: {:?}", store.path());
        }
        WeightsAction::Init { force } => {
            if store.path().exists() && !force {
                anyhow::bail!(
                    "Weights file already exists at {:?} (use --force to overwrite)",
                    store.path()
                );
            }
            store.save(&ComparisonWeights::default())?;
            println!("Wrote default weights to {:?}", store.path());
        }
    }

    Ok(())
}
