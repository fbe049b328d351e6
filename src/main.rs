//! CLI entry point for the source quality rater.
//!
//! Provides subcommands for running a full quality evaluation over a sample
//! directory and for inspecting the resolved configuration.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use clap::{Parser, Subcommand};
use source_quality_rater::config::{SourceConfig, TypologyConfig};
use source_quality_rater::evaluator::{EvaluationOptions, evaluate_sample};
use source_quality_rater::output::{write_evaluation_csv, write_json_index, write_summary_csv};
use source_quality_rater::reader::{DEFAULT_BATCH_SIZE, list_sample_files};
use source_quality_rater::report::render_reports;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "source_quality_rater")]
#[command(about = "A tool to rate the quality of event data sources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a sample directory and render reports
    Evaluate {
        /// Directory containing the .csv sample files
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Directory containing sources.toml and typologies.toml
        #[arg(short, long, default_value = "config")]
        config: PathBuf,

        /// Directory to write tables, reports, and charts to
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Value separator character of the sample files
        #[arg(short, long, default_value_t = ',')]
        separator: char,

        /// Period of time the sample refers to, in days
        #[arg(short, long)]
        period_days: f64,

        /// Maximum number of rows processed per batch
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Load the configuration and list the resolved sources and typologies
    Inspect {
        /// Directory containing sources.toml and typologies.toml
        #[arg(short, long, default_value = "config")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/source_quality_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("source_quality_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            input,
            config,
            output,
            separator,
            period_days,
            batch_size,
        } => {
            evaluate(
                &input,
                &config,
                &output,
                separator,
                period_days,
                batch_size,
            )?;
        }
        Commands::Inspect { config } => {
            inspect(&config)?;
        }
    }

    Ok(())
}

#[tracing::instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
fn evaluate(
    input: &Path,
    config: &Path,
    output: &Path,
    separator: char,
    period_days: f64,
    batch_size: usize,
) -> Result<()> {
    ensure!(
        separator.is_ascii(),
        "separator '{separator}' is not a single-byte character"
    );
    ensure!(period_days > 0.0, "period must be a positive number of days");

    let sources = SourceConfig::load(config)?;
    let typologies = TypologyConfig::load(config)?;
    let files = list_sample_files(input)?;
    info!(files = files.len(), "Sample files found");

    let opts = EvaluationOptions {
        separator: separator as u8,
        period_days,
        batch_size,
    };
    let outcome = evaluate_sample(&files, &sources, &typologies, &opts)?;

    std::fs::create_dir_all(output)?;
    write_evaluation_csv(&output.join("evaluation.csv"), &outcome.rows)?;
    write_summary_csv(&output.join("sources.csv"), &outcome.sources)?;
    write_json_index(&output.join("ratings.json"), &outcome.rows, &outcome.sources)?;
    render_reports(output, &outcome.rows, &outcome.sources)?;

    if let Some(best) = outcome.sources.first() {
        info!(
            source = %best.source,
            total = best.total,
            "Evaluation finished; best ranked source"
        );
    }
    Ok(())
}

fn inspect(config: &Path) -> Result<()> {
    let sources = SourceConfig::load(config)?;
    let typologies = TypologyConfig::load(config)?;

    for source in sources.sources() {
        match sources.resolve(source) {
            Ok(attrs) => {
                info!(
                    source,
                    source_type = %attrs.source_type,
                    frequency = %attrs.frequency,
                    consistency = %attrs.consistency,
                    unit_price = attrs.unit_price,
                    "Source"
                );
            }
            Err(e) => {
                warn!(source, error = %e, "Source configuration incomplete");
            }
        }
    }

    let typology_list: Vec<&str> = typologies.typologies().collect();
    info!(
        sources = sources.sources().count(),
        typologies = typology_list.len(),
        "Configuration summary"
    );
    for typology in typology_list {
        let mandatory = typologies.mandatory_fields(typology)?;
        info!(typology, mandatory_fields = mandatory.len(), "Typology");
    }

    Ok(())
}
