//! # mysql-es-migrate
//!
//! Batched, parallel MySQL to Elasticsearch bulk migration library.
//!
//! This library provides the core functionality for bulk-loading MySQL
//! tables into Elasticsearch indices with support for:
//!
//! - **Offset pagination** in natural table order, advancing by the rows
//!   each fetch actually returned
//! - **Schema-derived index mappings** inferred from declared column types
//! - **Sharded bulk writes** fanned out concurrently, one worker per shard
//! - **Round-robin endpoint assignment** across a destination node group
//! - **Throughput benchmarks** sweeping batch size or worker count
//!
//! ## Example
//!
//! ```rust,no_run
//! use mysql_es_migrate::{Config, EsClient, Migrator, MysqlPool, RunOptions, SubmitStrategy};
//!
//! #[tokio::main]
//! async fn main() -> mysql_es_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let source = MysqlPool::new(&config.source).await?;
//!     let client = EsClient::from_config(&config.destination, &config.destination.connection)?;
//!     let options = RunOptions::new("events", &config.migration, SubmitStrategy::Structured);
//!     let report = Migrator::new(source, client, options).run().await?;
//!     println!("Migrated {} rows", report.rows_migrated);
//!     Ok(())
//! }
//! ```

pub mod bench;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod es;
pub mod migrate;
pub mod shard;
pub mod source;
pub mod transform;
pub mod typemap;
pub mod verify;

// Re-exports for convenient access
pub use bench::{BenchKind, BenchReport, BenchSample};
pub use config::{Config, DestinationConfig, MigrationConfig, SourceConfig};
pub use dispatch::{DispatchStats, Dispatcher, ShardOutcome, SubmitStrategy};
pub use error::{MigrateError, Result};
pub use es::EsClient;
pub use migrate::{MigrationReport, Migrator, PhaseTimings, RunOptions};
pub use shard::Shard;
pub use source::{Column, MysqlPool, Row, SqlValue};
pub use transform::{BulkAction, Document};
pub use verify::{HealthReport, VerifyReport};
