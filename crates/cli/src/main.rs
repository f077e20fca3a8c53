use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edl::{to_display, EditConfig, EditList, EditSession, Intent};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "edl-cli")]
#[command(about = "Headless driver for the non-destructive edit decision list engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script of intents against a fresh session
    Replay {
        /// Base media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// JSON array of intents
        #[arg(short, long)]
        script: PathBuf,

        /// Config file (defaults to the user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Format seconds as M:SS
    Format {
        #[arg(allow_negative_numbers = true)]
        seconds: Vec<f64>,
    },

    /// Validate an exported edit list and print its flattened segments
    Resolve {
        /// Base media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Exported edit list JSON
        #[arg(short, long)]
        edits: PathBuf,
    },

    /// Print the effective configuration
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the effective configuration to the default location
        #[arg(long)]
        save: bool,
    },
}

#[derive(Serialize)]
struct Rejection {
    index: usize,
    error: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout carries the JSON reports
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            duration,
            script,
            config,
            output,
        } => replay_command(duration, script, config, output).await,
        Commands::Format { seconds } => format_command(seconds).await,
        Commands::Resolve { duration, edits } => resolve_command(duration, edits).await,
        Commands::Config { config, save } => config_command(config, save).await,
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gausian_edl")
        .join("edl.json")
}

/// An explicit path must exist; the default location is optional.
fn load_config(path: Option<PathBuf>) -> Result<EditConfig> {
    match path {
        Some(path) => EditConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let path = default_config_path();
            if path.exists() {
                info!("Using config: {:?}", path);
                EditConfig::load(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))
            } else {
                Ok(EditConfig::default())
            }
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

async fn replay_command(
    duration: f64,
    script: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config)?;
    let intents: Vec<Intent> = serde_json::from_str(&read_file(&script)?)
        .with_context(|| format!("invalid intent script {}", script.display()))?;
    let report = replay_report(duration, intents, config)?;

    if let Some(output_path) = output {
        std::fs::write(&output_path, report)?;
        info!("Report written to: {:?}", output_path);
    } else {
        println!("{}", report);
    }

    Ok(())
}

/// Run `intents` against a fresh session and render the pretty JSON report.
fn replay_report(duration: f64, intents: Vec<Intent>, config: EditConfig) -> Result<String> {
    let mut session = EditSession::new(duration, config)?;
    info!("Replaying {} intents over {}", intents.len(), to_display(duration));

    let rejected: Vec<Rejection> = session
        .apply_all(intents)
        .into_iter()
        .map(|(index, err)| Rejection {
            index,
            error: err.to_string(),
        })
        .collect();
    if !rejected.is_empty() {
        warn!("{} intents rejected", rejected.len());
    }

    let mut report = serde_json::to_value(session.report())?;
    report["rejected"] = serde_json::json!(rejected);
    report["timestamp"] = serde_json::json!(chrono::Utc::now().to_rfc3339());
    Ok(serde_json::to_string_pretty(&report)?)
}

async fn format_command(seconds: Vec<f64>) -> Result<()> {
    for s in seconds {
        anyhow::ensure!(
            s.is_finite() && s >= 0.0,
            "cannot format {}: times must be non-negative",
            s
        );
        println!("{}", to_display(s));
    }
    Ok(())
}

async fn resolve_command(duration: f64, edits: PathBuf) -> Result<()> {
    let list = EditList::from_json(duration, &read_file(&edits)?)
        .with_context(|| format!("invalid edit list {}", edits.display()))?;
    info!("Loaded {} edits", list.len());

    let segments = list.resolve_segments();
    println!("{}", serde_json::to_string_pretty(&segments)?);
    Ok(())
}

async fn config_command(path: Option<PathBuf>, save: bool) -> Result<()> {
    let config = load_config(path)?;
    if save {
        let target = default_config_path();
        config.save(&target)?;
        info!("Config saved to: {:?}", target);
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
