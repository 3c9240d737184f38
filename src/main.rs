// Mindguard - Conversation risk and state inference
// Main entry point

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::prelude::*;

use mindguard::config::{load_config, Config};
use mindguard::errors::{model_unavailable_message, PipelineError};
use mindguard::models::{ArtifactStore, DirArtifactStore};
use mindguard::pipeline::Pipeline;
use mindguard::providers::FallbackResponder;
use mindguard::session::Role;
use mindguard::training::{train_model, TrainingDataset};

#[derive(Parser, Debug)]
#[command(name = "mindguard")]
#[command(about = "Conversation risk and psychological-state inference", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Train the state classifier and write its artifacts
    Train {
        /// Labeled CSV with statement,status columns (defaults to config)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Retrain even if artifacts already exist
        #[arg(long)]
        force: bool,
    },
    /// Run the crisis check on one message
    Check {
        /// Message text
        text: String,
    },
    /// Analyze a conversation of user turns (arguments, or stdin lines)
    Analyze {
        turns: Vec<String>,
    },
    /// Line-by-line conversation; `/end` or EOF ends the session
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = load_config()?;

    match args.command {
        Command::Train { dataset, force } => run_train(&config, dataset, force),
        Command::Check { text } => run_check(&config, &text),
        Command::Analyze { turns } => run_analyze(&config, turns),
        Command::Chat => run_chat(&config).await,
    }
}

/// Initialize tracing to stderr so JSON on stdout stays machine-readable
///
/// Default: INFO level (DEBUG with MINDGUARD_DEBUG=1), overridden by RUST_LOG
fn init_tracing() {
    let show_debug = std::env::var("MINDGUARD_DEBUG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);
    let default_level = if show_debug { "debug" } else { "info" };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run_train(config: &Config, dataset: Option<PathBuf>, force: bool) -> Result<()> {
    let Some(dataset_path) = dataset.or_else(|| config.dataset_path.clone()) else {
        bail!(
            "No training dataset. Pass --dataset or set MINDGUARD_DATASET.\n\n\
            Expected a CSV with columns:\n\
            • statement - free text\n\
            • status    - Normal, Depression, Bipolar, Anxiety or Suicidal"
        );
    };

    let store = DirArtifactStore::new(&config.model_dir);
    if store.exists() && !force {
        println!("Artifacts already exist in {}", store.location());
        println!("Use --force to retrain.");
        return Ok(());
    }

    let dataset = TrainingDataset::load_csv(&dataset_path)
        .with_context(|| format!("Failed to load dataset {}", dataset_path.display()))?;
    let outcome = train_model(&dataset, &config.training).context("Training failed")?;
    outcome.model.save(&store).context("Failed to save artifacts")?;

    println!("✓ Trained on {} samples ({} dropped)", dataset.len(), dataset.dropped);
    if let Some(report) = outcome.report {
        println!("\n{}", report);
    }
    println!("\nArtifacts written to {}", store.location());
    Ok(())
}

fn run_check(config: &Config, text: &str) -> Result<()> {
    let catalog = match &config.keywords_path {
        Some(path) => mindguard::crisis::KeywordCatalog::load_from_file(path)?,
        None => mindguard::crisis::KeywordCatalog::builtin(),
    };
    let detector = mindguard::crisis::CrisisDetector::new(std::sync::Arc::new(catalog));
    let matched = detector.matched_phrase(text);

    let output = serde_json::json!({
        "is_crisis": matched.is_some(),
        "matched_phrase": matched,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let pipeline = Pipeline::initialize(config)?;
    if !pipeline.classifier().is_ready() {
        eprintln!("{}\n", model_unavailable_message(&config.model_dir.display().to_string()));
    }
    Ok(pipeline)
}

fn run_analyze(config: &Config, turns: Vec<String>) -> Result<()> {
    let turns = if turns.is_empty() && !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        input
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        turns
    };

    let pipeline = build_pipeline(config)?;
    let session_id = pipeline.sessions().create()?;
    for turn in &turns {
        pipeline.record_turn(&session_id, Role::User, turn)?;
    }

    let report = pipeline.end_session(&session_id)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_chat(config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config)?;
    let responder = FallbackResponder::new();
    let session_id = pipeline.sessions().create()?;

    eprintln!("Session {} started. Type /end to finish.", session_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/end" {
            break;
        }

        let reply = pipeline
            .handle_message(&responder, Some(&session_id), line)
            .await?;
        println!("{}\n", reply.response);
    }

    match pipeline.end_session(&session_id) {
        Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        Err(PipelineError::NoDataToAnalyze(_)) => eprintln!("No conversation to analyze."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
