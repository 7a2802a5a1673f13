//! CLI entry point for the NASA battery dataset builder.
//!
//! Provides subcommands for building the labelled SOH/RUL table from the
//! NASA metadata catalog and for summarizing a single measurement file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use nasa_battery_dataset::config::PipelineConfig;
use nasa_battery_dataset::output::print_preview;
use nasa_battery_dataset::pipeline;
use nasa_battery_dataset::trace::{DirectorySource, Phase, TraceSource};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "nasa_battery_dataset")]
#[command(about = "Builds SOH/RUL training data from NASA battery cycling files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the per-cycle dataset with SOH and RUL labels
    Build {
        /// JSON config file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Metadata catalog CSV
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Directory containing the per-cycle measurement CSVs
        #[arg(short, long)]
        data_root: Option<PathBuf>,

        /// CSV file to write (overwritten)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Optional: write a per-battery JSON summary to this path
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Number of rows to preview on stdout (0 = none)
        #[arg(long)]
        preview_rows: Option<usize>,
    },
    /// Summarize a single measurement file
    Summarize {
        /// Path to the measurement CSV
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Activity threshold to apply: charge, discharge or any
        #[arg(short, long, default_value = "any")]
        phase: Phase,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/nasa_battery_dataset.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("nasa_battery_dataset.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            metadata,
            data_root,
            output,
            summary_json,
            preview_rows,
        } => {
            let mut config = match config {
                Some(path) => PipelineConfig::load(&path)?,
                None => PipelineConfig::default(),
            };
            if let Some(metadata) = metadata {
                config.metadata_path = metadata;
            }
            if let Some(data_root) = data_root {
                config.data_root = data_root;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            if summary_json.is_some() {
                config.summary_path = summary_json;
            }
            if let Some(preview_rows) = preview_rows {
                config.preview_rows = preview_rows;
            }

            let report = pipeline::run(&config)?;
            info!(
                batteries = report.batteries,
                unpaired_cycles = report.unpaired_cycles,
                "Dataset ready"
            );

            print_preview(&report.output_path, &report.rows, config.preview_rows);
        }
        Commands::Summarize { file, phase } => {
            let dir = file.parent().unwrap_or(Path::new("."));
            let name = file
                .file_name()
                .and_then(OsStr::to_str)
                .ok_or_else(|| anyhow::anyhow!("invalid file name: {}", file.display()))?;

            let summary = DirectorySource::new(dir).summarize(name, phase)?;

            info!(
                file = %file.display(),
                ?phase,
                current = summary.current,
                voltage = summary.voltage,
                temperature = summary.temperature,
                "Trace summary"
            );
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
