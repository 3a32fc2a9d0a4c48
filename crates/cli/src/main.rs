//! sheetdedup CLI
//!
//! Find rows whose key columns repeat an earlier row in spreadsheet files,
//! and split each file into unique and duplicate rows.

mod config;
mod progress;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sheetdedup_core::{BatchPipeline, CancellationToken, KeySpec};
use sheetdedup_formats::{discover_inputs, inspect, OutputLayout};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::{DedupConfig, Overrides};
use progress::{BatchProgress, BatchTotals, InspectRow};

#[derive(Parser)]
#[command(name = "sheetdedup")]
#[command(version, about = "Find and split duplicate rows in spreadsheet files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output reports in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split files into unique and duplicate rows by key columns
    Dedup {
        /// Spreadsheet files or folders containing them
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,

        /// Key columns, 1-based (e.g. "1,3-5")
        #[arg(short, long, value_name = "COLS")]
        key: Option<KeySpec>,

        /// Compare text ignoring case
        #[arg(long)]
        case_insensitive: bool,

        /// Number of files processed in parallel
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Write all results into this directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Suffix for the unique-rows file
        #[arg(long, value_name = "SUFFIX")]
        unique_suffix: Option<String>,

        /// Suffix for the duplicate-rows file
        #[arg(long, value_name = "SUFFIX")]
        duplicate_suffix: Option<String>,

        /// Fail instead of passing rows through when no key column is given
        #[arg(long)]
        require_key: bool,

        /// Config file with defaults (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show statistics without writing output
        #[arg(long)]
        dry_run: bool,
    },

    /// Show row and column counts of spreadsheet files
    Inspect {
        /// Spreadsheet files or folders containing them
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.json)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Dedup {
            paths,
            key,
            case_insensitive,
            jobs,
            output_dir,
            unique_suffix,
            duplicate_suffix,
            require_key,
            config,
            dry_run,
        } => {
            let overrides = Overrides {
                key,
                case_insensitive,
                jobs,
                output_dir,
                unique_suffix,
                duplicate_suffix,
                require_key,
                dry_run,
            };
            dedup(paths, config, overrides, cli.json).await
        }
        Commands::Inspect { paths } => inspect_files(paths, cli.json).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn dedup(
    paths: Vec<PathBuf>,
    config_path: Option<PathBuf>,
    overrides: Overrides,
    json_output: bool,
) -> Result<ExitCode> {
    let config = match &config_path {
        Some(path) => DedupConfig::load(path)?,
        None => DedupConfig::default(),
    };
    let options = config.resolve(overrides)?;

    let inputs = discover_inputs(&paths, &options.layout);

    info!("Starting deduplication");
    info!("  Files: {}", inputs.len());
    info!("  Key columns: [{}]", options.key_spec);
    info!("  Case sensitive: {}", options.normalize.case_sensitive);
    if let Some(path) = &config_path {
        info!("  Config: {:?}", path);
    }

    let dry_run = !options.write_outputs;
    let output_dir = options.layout.output_dir.clone();

    let cancel = CancellationToken::new();
    let pipeline = BatchPipeline::with_cancellation(options, cancel.clone())?;
    pipeline.check_preconditions(&inputs)?;

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted: finishing files in progress, skipping the rest");
                cancel.cancel();
            }
        }
    });

    let progress = BatchProgress::new(inputs.len(), json_output)?;
    let (reports, progress) = tokio::task::spawn_blocking(move || {
        let reports = pipeline.run_with_progress(&inputs, |report| progress.record(report));
        (reports, progress)
    })
    .await
    .context("Deduplication task panicked")?;
    let reports = reports?;
    progress.finish();

    let totals = BatchTotals::from_reports(&reports);

    if json_output {
        let report = serde_json::json!({
            "files": reports,
            "totals": totals,
            "dry_run": dry_run,
            "cancelled": cancel.is_cancelled(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        progress::print_file_table(&reports);
        progress::print_summary_report(&totals, output_dir.as_deref(), dry_run);
    }

    if totals.is_complete_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn inspect_files(paths: Vec<PathBuf>, json_output: bool) -> Result<ExitCode> {
    let inputs = discover_inputs(&paths, &OutputLayout::default());
    info!("Inspecting {} files", inputs.len());

    let rows: Vec<InspectRow> = tokio::task::spawn_blocking(move || {
        inputs
            .into_iter()
            .map(|path| match inspect(&path) {
                Ok(shape) => InspectRow {
                    path,
                    shape: Some(shape),
                    error: None,
                },
                Err(e) => {
                    warn!("Failed to inspect {:?}: {}", path, e);
                    InspectRow {
                        path,
                        shape: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    })
    .await
    .context("Inspection task panicked")?;

    let any_failed = rows.iter().any(|row| row.error.is_some());

    if json_output {
        let report = serde_json::json!({
            "files": rows,
            "max_columns": progress::max_columns(&rows),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        progress::print_inspect_table(&rows);
    }

    if any_failed {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}
