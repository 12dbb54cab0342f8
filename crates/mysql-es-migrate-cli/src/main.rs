//! mysql-es-migrate CLI - Batched, parallel MySQL to Elasticsearch migration.

use clap::{Parser, Subcommand};
use mysql_es_migrate::{
    bench, config, typemap, verify, Config, EsClient, MigrateError, MigrationReport, Migrator,
    MysqlPool, RunOptions, SubmitStrategy,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "mysql-es-migrate")]
#[command(about = "Batched, parallel MySQL to Elasticsearch migration")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Destination connection group (overrides the configured default)
    #[arg(short = 'C', long)]
    connection: Option<String>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a table using structured bulk calls
    Migrate {
        /// Table to migrate [default: migration.table from config]
        #[arg(short, long)]
        table: Option<String>,

        /// Rows per worker per batch [default: 5000]
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Total row budget for the run [default: 20000]
        #[arg(short, long)]
        limit: Option<i64>,

        /// Concurrent bulk submissions per batch [default: 1]
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Migrate a table with parallel raw NDJSON submissions
    Parallel {
        /// Table to migrate [default: migration.table from config]
        #[arg(short, long)]
        table: Option<String>,

        /// Rows per worker per batch [default: 5000]
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Total row budget for the run [default: 20000]
        #[arg(short, long)]
        limit: Option<i64>,

        /// Concurrent bulk submissions per batch [default: 4]
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Benchmark batch sizes 100*2^low through 100*2^high
    Sizetest {
        /// Table to benchmark [default: migration.table from config]
        #[arg(short, long)]
        table: Option<String>,

        /// Smallest exponent in the sweep
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(0..=24))]
        low: u32,

        /// Largest exponent in the sweep
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(0..=24))]
        high: u32,
    },

    /// Benchmark worker counts low through high
    Workertest {
        /// Table to benchmark [default: migration.table from config]
        #[arg(short, long)]
        table: Option<String>,

        /// Rows per worker per batch [default: 5000]
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Total row budget for each run [default: 20000]
        #[arg(short, long)]
        limit: Option<i64>,

        /// Smallest worker count in the sweep
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        low: u32,

        /// Largest worker count in the sweep
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..))]
        high: u32,
    },

    /// List tables in the source database
    Tables,

    /// Show a table's columns and the index mapping inferred from them
    Schema {
        /// Table to describe [default: migration.table from config]
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Count rows in a source table
    Count {
        /// Table to count [default: migration.table from config]
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Compare source row count with destination document count
    Verify {
        /// Table to verify [default: migration.table from config]
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Test source and destination connectivity
    Health,

    /// Write a starter configuration file
    Init {
        /// Output path for configuration file [default: config.yaml]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite existing file without confirmation
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    // Handle init command separately (doesn't need an existing config)
    if let Commands::Init { output, force } = &cli.command {
        let output_path = output.clone().unwrap_or_else(|| PathBuf::from("config.yaml"));
        if output_path.exists() && !*force {
            return Err(MigrateError::Config(format!(
                "{} already exists; pass --force to overwrite",
                output_path.display()
            )));
        }
        std::fs::write(&output_path, config::sample_yaml())?;
        println!("Wrote starter configuration to {}", output_path.display());
        return Ok(());
    }

    // Setup logging
    setup_logging(&cli.verbosity, &cli.log_format).map_err(MigrateError::Config)?;

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let group = cli
        .connection
        .clone()
        .unwrap_or_else(|| config.destination.connection.clone());

    match cli.command {
        Commands::Init { .. } => unreachable!(), // Handled above

        Commands::Migrate {
            table,
            batch_size,
            limit,
            workers,
        } => {
            let table = config.migration.resolve_table(table)?;

            // Apply overrides
            if let Some(b) = batch_size {
                config.migration.batch_size = Some(b);
            }
            if let Some(l) = limit {
                config.migration.limit = Some(l);
            }
            if let Some(w) = workers {
                config.migration.workers = Some(w);
            }
            // Flag values get the same checks as file values
            config.validate()?;

            let options = RunOptions::new(&table, &config.migration, SubmitStrategy::Structured);
            let source = MysqlPool::new(&config.source).await?;
            let client = EsClient::from_config(&config.destination, &group)?;

            let report = Migrator::new(source, client, options).run().await?;
            print_report(&report, cli.output_json)?;
        }

        Commands::Parallel {
            table,
            batch_size,
            limit,
            workers,
        } => {
            let table = config.migration.resolve_table(table)?;

            // Apply overrides; the parallel path defaults to four workers
            if let Some(b) = batch_size {
                config.migration.batch_size = Some(b);
            }
            if let Some(l) = limit {
                config.migration.limit = Some(l);
            }
            if let Some(w) = workers {
                config.migration.workers = Some(w);
            }
            config.migration.workers.get_or_insert(4);
            config.validate()?;

            let options = RunOptions::new(&table, &config.migration, SubmitStrategy::Raw);
            let source = MysqlPool::new(&config.source).await?;
            let client = EsClient::from_config(&config.destination, &group)?;

            let report = Migrator::new(source, client, options).run().await?;
            print_report(&report, cli.output_json)?;
        }

        Commands::Sizetest { table, low, high } => {
            let table = config.migration.resolve_table(table)?;
            let source = MysqlPool::new(&config.source).await?;
            let client = EsClient::from_config(&config.destination, &group)?;

            let report =
                bench::benchmark_batch_sizes(&source, &client, &table, &config.migration, low, high)
                    .await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render());
            }
        }

        Commands::Workertest {
            table,
            batch_size,
            limit,
            low,
            high,
        } => {
            let table = config.migration.resolve_table(table)?;

            // Apply overrides; the sweep itself sets the worker count
            if let Some(b) = batch_size {
                config.migration.batch_size = Some(b);
            }
            if let Some(l) = limit {
                config.migration.limit = Some(l);
            }
            config.validate()?;

            let source = MysqlPool::new(&config.source).await?;
            let client = EsClient::from_config(&config.destination, &group)?;

            let report =
                bench::benchmark_workers(&source, &client, &table, &config.migration, low, high)
                    .await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render());
            }
        }

        Commands::Tables => {
            let source = MysqlPool::new(&config.source).await?;
            let tables = source.list_tables().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for table in &tables {
                    println!("{}", table);
                }
            }
        }

        Commands::Schema { table } => {
            let table = config.migration.resolve_table(table)?;
            let source = MysqlPool::new(&config.source).await?;
            let columns = source.describe(&table).await?;

            if columns.is_empty() {
                return Err(MigrateError::Config(format!(
                    "no columns found for table '{}'",
                    table
                )));
            }

            if cli.output_json {
                let mapping = typemap::index_mapping(&config.migration.doc_type, &columns);
                println!("{}", serde_json::to_string_pretty(&mapping)?);
            } else {
                println!("Columns of {}:", table);
                for col in &columns {
                    println!(
                        "  {} {} -> {}",
                        col.name,
                        col.data_type,
                        typemap::es_type(&col.data_type).as_str()
                    );
                }
            }
        }

        Commands::Count { table } => {
            let table = config.migration.resolve_table(table)?;
            let source = MysqlPool::new(&config.source).await?;
            let rows = source.count(&table).await?;

            if cli.output_json {
                println!("{}", serde_json::json!({ "table": table, "rows": rows }));
            } else {
                println!("{}: {} rows", table, rows);
            }
        }

        Commands::Verify { table } => {
            let table = config.migration.resolve_table(table)?;
            let index = config.migration.index_name(&table);
            let source = MysqlPool::new(&config.source).await?;
            let client = EsClient::from_config(&config.destination, &group)?;

            let report = verify::verify_counts(&source, &client, &table, &index).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Verification of {} against {}:", report.table, report.index);
                println!("  Source rows: {}", report.source_rows);
                println!("  Destination documents: {}", report.destination_docs);
                println!("  Match: {}", if report.matched { "YES" } else { "NO" });
            }
        }

        Commands::Health => {
            let client = EsClient::from_config(&config.destination, &group)?;
            let report = verify::health_check(&config.source, &client).await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source (MySQL): {} ({}ms)",
                    if report.source_connected { "OK" } else { "FAILED" },
                    report.source_latency_ms.unwrap_or(0)
                );
                if let Some(ref err) = report.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  Destination (Elasticsearch): {} ({}ms)",
                    if report.destination_connected { "OK" } else { "FAILED" },
                    report.destination_latency_ms.unwrap_or(0)
                );
                if let Some(ref err) = report.destination_error {
                    println!("    Error: {}", err);
                }
                if let Some(ref status) = report.cluster_status {
                    println!("  Cluster status: {}", status);
                }
                println!(
                    "\n  Overall: {}",
                    if report.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !report.healthy {
                return Err(MigrateError::Config("Health check failed".to_string()));
            }
        }
    }

    Ok(())
}

fn print_report(report: &MigrationReport, output_json: bool) -> Result<(), MigrateError> {
    if output_json {
        println!("{}", report.to_json()?);
    } else {
        println!("\nMigration completed!");
        println!("  Run ID: {}", report.run_id);
        println!("  Table: {} -> {}", report.table, report.index);
        println!("  Rows: {}", report.rows_migrated);
        println!("  Batches: {}", report.batches);
        println!(
            "  Shards: {} submitted, {} failed",
            report.shards_submitted, report.shards_failed
        );
        if report.rate_limit_hits > 0 {
            println!("  Rate limited: {} shard(s)", report.rate_limit_hits);
        }
        println!(
            "  Phases: setup {:.2}s, query {:.2}s, transform {:.2}s, dispatch {:.2}s",
            report.setup_seconds,
            report.query_seconds,
            report.transform_seconds,
            report.dispatch_seconds
        );
        println!(
            "  Total: {:.2}s ({} rows/sec)",
            report.total_seconds, report.rows_per_second
        );
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        // Unrecognized values fall back to info rather than erroring out
        _ => Level::INFO,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false);

    match format {
        "json" => builder.json().init(),
        _ => builder.init(),
    }

    Ok(())
}
