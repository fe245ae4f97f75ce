//! prospector: enrich and validate people lists.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};

use prospector::answer::AnswerClient;
use prospector::config::Config;
use prospector::error::PipelineError;
use prospector::pipeline::{self, EnrichMode};
use prospector::table::RecordTable;
use prospector::validate;

#[derive(Parser)]
#[command(name = "prospector")]
#[command(about = "Contact enrichment and validation for people lists", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean junk, fake, and masked values in a people CSV
    Clean {
        input: PathBuf,
        /// Output path (default: input with a _clean suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Batched phone + email lookup for a people CSV
    Enrich {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Records per external query
        #[arg(long, default_value_t = prospector::config::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// Only process the first N records
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Per-record contact lookup using each record's bio/location context
    EnrichContacts {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Per-record LinkedIn profile lookup
    EnrichLinkedin {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Heuristic + verification pass over phone numbers
    Validate {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Full pipeline: clean, batched enrich, validate
    Run {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = prospector::config::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Derive `people_suffix.csv` from `people.csv`.
fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    input.with_file_name(format!("{}_{}.csv", stem, suffix))
}

fn load_table(path: &Path, limit: Option<usize>) -> Result<RecordTable, PipelineError> {
    let mut table = RecordTable::read(path)?;
    if let Some(limit) = limit {
        table.truncate(limit);
    }
    Ok(table)
}

fn build_client(config: &Config) -> Result<AnswerClient, PipelineError> {
    AnswerClient::new(
        &config.api_key,
        &config.base_url,
        Duration::from_secs(config.timeout_secs),
    )
    .map_err(|e| PipelineError::Configuration(e.to_string()))
}

async fn execute(cli: Cli) -> Result<(), PipelineError> {
    match cli.command {
        Commands::Clean { input, output } => {
            let output = output.unwrap_or_else(|| default_output(&input, "clean"));
            let mut table = load_table(&input, None)?;
            let stats = pipeline::clean_table(&mut table);
            table.write(&output)?;
            log::info!(
                "Cleaned {} field values across {} records -> {}",
                stats.changed(),
                stats.total,
                output.display()
            );
            let summary = pipeline::RunSummary {
                started_at: chrono::Utc::now().to_rfc3339(),
                total: stats.total,
                clean: stats,
                validation: None,
                coverage: pipeline::coverage(&table),
            };
            pipeline::log_summary(&summary);
        }

        Commands::Enrich {
            input,
            output,
            batch_size,
            limit,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input, "phones"));
            let mut config = Config::from_env()?;
            config.batch_size = batch_size;
            config.limit = limit;
            let client = build_client(&config)?;
            let mut table = load_table(&input, config.limit)?;
            let matched = pipeline::enrich_table(&client, &mut table, &config, EnrichMode::Batch).await;
            table.write(&output)?;
            log::info!("Matched {}/{} records -> {}", matched, table.len(), output.display());
        }

        Commands::EnrichContacts { input, output, limit } => {
            let output = output.unwrap_or_else(|| default_output(&input, "enriched"));
            let mut config = Config::from_env()?;
            config.limit = limit;
            let client = build_client(&config)?;
            let mut table = load_table(&input, config.limit)?;
            let found =
                pipeline::enrich_table(&client, &mut table, &config, EnrichMode::Contact).await;
            table.write(&output)?;
            log::info!(
                "{}/{} phone numbers found -> {}",
                found,
                table.len(),
                output.display()
            );
        }

        Commands::EnrichLinkedin { input, output, limit } => {
            let output = output.unwrap_or_else(|| default_output(&input, "enriched"));
            let mut config = Config::from_env()?;
            config.limit = limit;
            let client = build_client(&config)?;
            let mut table = load_table(&input, config.limit)?;
            let found =
                pipeline::enrich_table(&client, &mut table, &config, EnrichMode::Linkedin).await;
            table.write(&output)?;
            log::info!(
                "{}/{} profiles found -> {}",
                found,
                table.len(),
                output.display()
            );
        }

        Commands::Validate { input, output } => {
            let output = output.unwrap_or_else(|| default_output(&input, "validated"));
            let config = Config::from_env()?;
            let client = build_client(&config)?;
            let mut table = load_table(&input, None)?;
            let stats = validate::validate_table(&client, &mut table, &config).await;
            table.write(&output)?;
            log::info!(
                "Validated {} records: {} suspect, {} verified, {} rejected -> {}",
                stats.total,
                stats.suspect,
                stats.verified,
                stats.rejected,
                output.display()
            );
        }

        Commands::Run {
            input,
            output,
            batch_size,
            limit,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input, "final"));
            let mut config = Config::from_env()?;
            config.batch_size = batch_size;
            config.limit = limit;
            let client = build_client(&config)?;
            let mut table = load_table(&input, config.limit)?;
            let summary = pipeline::run_all(&client, &mut table, &config).await?;
            table.write(&output)?;
            pipeline::log_summary(&summary);
            log::info!("Output -> {}", output.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = execute(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
