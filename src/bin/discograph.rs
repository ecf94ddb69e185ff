//! Discograph CLI: discourse-graph document translation.
//!
//! Usage:
//!   discograph translate --input doc.jsonl --output out.json [--reverse]
//!   discograph retranslate --artifact in.json --output out.json [--swap] [--reverse]
//!   discograph inspect --artifact out.json

use clap::{Parser, Subcommand};
use discograph::config::{load_config, resolve_config_path};
use discograph::oracle::ChatOracle;
use discograph::workflow::require_input;
use discograph::{
    load_artifact, read_sentences, AppConfig, DiscourseGraph, Oracles, RunOutcome,
    TranslationWorkflow, WorkflowBuilder,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "discograph",
    version,
    about = "Translate long documents along a discourse dependency graph"
)]
struct Cli {
    /// Path to the YAML config (default: $DISCOGRAPH_CONFIG, then config/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph over a JSONL sentence file and translate it
    Translate {
        /// One {"text": ...} object per line
        #[arg(long)]
        input: PathBuf,
        /// Where the artifact is written
        #[arg(long)]
        output: PathBuf,
        /// Translate target -> source (back-translation)
        #[arg(long)]
        reverse: bool,
    },
    /// Translate again over the graph stored in an artifact
    Retranslate {
        /// Artifact from an earlier run
        #[arg(long)]
        artifact: PathBuf,
        /// Where the new artifact is written
        #[arg(long)]
        output: PathBuf,
        /// Exchange source and target of the loaded artifact
        #[arg(long)]
        swap: bool,
        /// Translate target -> source
        #[arg(long)]
        reverse: bool,
    },
    /// Print counts and untranslated units of an artifact
    Inspect {
        #[arg(long)]
        artifact: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_config(explicit: Option<&Path>) -> Result<AppConfig, String> {
    match resolve_config_path(explicit) {
        Some(path) => load_config(&path).map_err(|e| e.to_string()),
        None => {
            tracing::info!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

fn open_workflow(config: &AppConfig, reverse: bool) -> Result<TranslationWorkflow, String> {
    let processing = Arc::new(ChatOracle::new(config.processing_endpoint()));
    let generation = Arc::new(ChatOracle::new(config.translation_endpoint()));
    let mut builder = WorkflowBuilder::from_config(Oracles::split(processing, generation), config);
    if reverse {
        builder = builder.with_languages(config.language_pair().reversed());
    }
    builder.build().map_err(|e| e.to_string())
}

fn report(outcome: &RunOutcome, output: &Path) -> i32 {
    let r = &outcome.report;
    println!(
        "Wrote {} ({} units, {} edges, {} translated, {} failed)",
        output.display(),
        r.unit_count,
        r.edge_count,
        r.translated_units,
        r.failed_count()
    );
    if r.incomplete {
        eprintln!("Warning: failed units {:?} exceed the configured threshold", r.failed_units);
        2
    } else {
        0
    }
}

async fn cmd_translate(config: &AppConfig, input: &Path, output: &Path, reverse: bool) -> i32 {
    let sentences = match require_input(input)
        .map_err(|e| e.to_string())
        .and_then(|p| read_sentences(p).map_err(|e| e.to_string()))
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let workflow = match open_workflow(config, reverse) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    tracing::info!(sentences = sentences.len(), languages = %workflow.languages(), "translating");

    match workflow.run(sentences, output, None).await {
        Ok(outcome) => report(&outcome, output),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_retranslate(
    config: &AppConfig,
    artifact: &Path,
    output: &Path,
    swap: bool,
    reverse: bool,
) -> i32 {
    let loaded = match require_input(artifact)
        .map_err(|e| e.to_string())
        .and_then(|p| load_artifact(p, swap).map_err(|e| e.to_string()))
    {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let workflow = match open_workflow(config, reverse) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    tracing::info!(units = loaded.graph.len(), swap, languages = %workflow.languages(), "retranslating");

    let sentences = loaded.source_sentences.clone();
    let graph: DiscourseGraph = loaded.into_graph();
    match workflow.run(sentences, output, Some(graph)).await {
        Ok(outcome) => report(&outcome, output),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_inspect(artifact: &Path) -> i32 {
    let loaded = match require_input(artifact)
        .map_err(|e| e.to_string())
        .and_then(|p| load_artifact(p, false).map_err(|e| e.to_string()))
    {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let untranslated: Vec<usize> = loaded
        .graph
        .units
        .iter()
        .filter(|u| !u.is_translated())
        .map(|u| u.id)
        .collect();
    let long_range = loaded.graph.edges.iter().filter(|e| !e.is_adjacent()).count();

    println!("Source sentences: {}", loaded.source_sentences.len());
    println!("Target sentences: {}", loaded.target_sentences.len());
    println!("Units:            {}", loaded.graph.len());
    println!("Edges:            {} ({} long-range)", loaded.graph.edges.len(), long_range);
    if untranslated.is_empty() {
        println!("Untranslated:     none");
    } else {
        println!("Untranslated:     {:?}", untranslated);
    }
    0
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Inspect { artifact } => cmd_inspect(&artifact),
        Commands::Translate {
            input,
            output,
            reverse,
        } => match open_config(cli.config.as_deref()) {
            Ok(config) => cmd_translate(&config, &input, &output, reverse).await,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Retranslate {
            artifact,
            output,
            swap,
            reverse,
        } => match open_config(cli.config.as_deref()) {
            Ok(config) => cmd_retranslate(&config, &artifact, &output, swap, reverse).await,
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
