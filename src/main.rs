use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use record_pipeline::constants;
use record_pipeline::generator::SampleGenerator;
use record_pipeline::observability;
use record_pipeline::pipeline::Statistics;
use record_pipeline::{Config, PipelineError, RecordProcessor};

#[derive(Parser)]
#[command(name = "record_pipeline")]
#[command(about = "Batch record transformation pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sample records, process them in batches and export the results
    Run {
        /// Config file (.toml or .json); falls back to PIPELINE_CONFIG, then defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of sample records to generate
        #[arg(long, default_value_t = 50)]
        records: usize,
        /// Seed for reproducible sample data
        #[arg(long)]
        seed: Option<u64>,
        /// Export destination
        #[arg(long, default_value = constants::DEFAULT_OUTPUT_PATH)]
        output: PathBuf,
        /// Export format (only json is supported)
        #[arg(long, default_value = "json")]
        format: String,
        /// Print a Prometheus metrics snapshot after the run
        #[arg(long)]
        print_metrics: bool,
    },
    /// Print the effective configuration as TOML
    ShowConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn config_path(arg: Option<PathBuf>) -> Option<PathBuf> {
    arg.or_else(|| std::env::var(constants::CONFIG_PATH_ENV).ok().map(PathBuf::from))
}

fn print_statistics(stats: &Statistics) {
    println!("\n{}", "=".repeat(50));
    println!("PROCESSING STATISTICS");
    println!("{}", "=".repeat(50));
    println!("Processed Count: {}", stats.processed_count);
    println!("Failed Count: {}", stats.failed_count);
    println!("Start Time: {}", stats.start_time.to_rfc3339());
    println!("Runtime Seconds: {:.3}", stats.runtime_seconds);
    println!("Records Per Second: {:.3}", stats.records_per_second);
    println!("Success Rate: {:.3}", stats.success_rate);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_dir = std::env::var(constants::LOG_DIR_ENV)
        .unwrap_or_else(|_| constants::DEFAULT_LOG_DIR.to_string());
    let _guard = observability::init_logging(PathBuf::from(log_dir).as_path());

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            records,
            seed,
            output,
            format,
            print_metrics,
        } => {
            let metrics_handle = if print_metrics {
                match observability::metrics::init() {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        warn!("Metrics disabled: {}", e);
                        None
                    }
                }
            } else {
                None
            };

            let config = Config::load_or_default(config_path(config).as_deref());
            let mut processor =
                RecordProcessor::new(config).context("Invalid pipeline configuration")?;

            let sample = SampleGenerator::new(seed)
                .generate(records)
                .context("Failed to generate sample records")?;

            info!("🚀 Processing {} records", sample.len());
            let summary = processor.process_all(sample).await;
            if summary.timed_out_batches > 0 {
                warn!("{} batches timed out and were discarded", summary.timed_out_batches);
            }

            print_statistics(&processor.statistics());

            match processor.export(&output, &format).await {
                Ok(export) => {
                    println!("\nResults exported to: {}", export.destination);
                }
                Err(PipelineError::Export(e)) => {
                    error!("Export failed: {}", e);
                    println!("\n⚠️  Export skipped: {}", e);
                }
                Err(e) => return Err(e.into()),
            }

            if let Some(handle) = metrics_handle {
                println!("\n{}", handle.render());
            }
        }
        Commands::ShowConfig { config } => {
            let config = Config::load_or_default(config_path(config).as_deref());
            config.validate().context("Invalid pipeline configuration")?;
            println!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
