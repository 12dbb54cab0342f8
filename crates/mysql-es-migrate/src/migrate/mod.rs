//! Migration orchestration.
//!
//! One run is a straight line: recreate the destination index from the
//! table's schema, then fetch, transform, and dispatch batch after batch
//! until the table runs dry or the row budget is spent. Batches are strictly
//! sequential; only the shards inside a batch run concurrently.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::MigrationConfig;
use crate::dispatch::{Dispatcher, SubmitStrategy};
use crate::error::{MigrateError, Result};
use crate::es::EsClient;
use crate::shard;
use crate::source::{Column, MysqlPool};
use crate::transform;
use crate::typemap;

/// Resolved parameters for one migration run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub table: String,
    pub index: String,
    pub doc_type: String,
    pub batch_size: usize,
    pub workers: usize,
    pub limit: i64,
    pub strategy: SubmitStrategy,
}

impl RunOptions {
    /// Resolve options for a table from configuration defaults.
    pub fn new(table: &str, config: &MigrationConfig, strategy: SubmitStrategy) -> Self {
        Self {
            table: table.to_string(),
            index: config.index_name(table),
            doc_type: config.doc_type.clone(),
            batch_size: config.get_batch_size(),
            workers: config.get_workers(),
            limit: config.get_limit(),
            strategy,
        }
    }

    /// Rows requested per fetch: the nominal batch size per worker, so every
    /// worker's shard carries a full nominal batch.
    pub fn effective_batch(&self) -> usize {
        self.batch_size * self.workers
    }
}

/// Wall-clock time accumulated per phase across all batches of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTimings {
    pub setup: Duration,
    pub query: Duration,
    pub transform: Duration,
    pub dispatch: Duration,
}

impl PhaseTimings {
    /// Total run time as the sum of the four phases.
    pub fn total(&self) -> Duration {
        self.setup + self.query + self.transform + self.dispatch
    }
}

/// Offset and remaining-budget bookkeeping for the batch loop.
///
/// The offset advances by the rows a fetch actually returned, never by the
/// requested batch size, so a short page neither skips nor repeats rows.
/// The budget gates loop entry only; the final batch may overshoot it.
#[derive(Debug, Clone, Copy)]
struct BatchCursor {
    offset: i64,
    remaining: i64,
}

impl BatchCursor {
    fn new(limit: i64) -> Self {
        Self {
            offset: 0,
            remaining: limit,
        }
    }

    fn exhausted(&self) -> bool {
        self.remaining <= 0
    }

    fn advance(&mut self, rows: usize) {
        self.offset += rows as i64;
        self.remaining -= rows as i64;
    }
}

/// Final accounting for one migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: String,
    pub table: String,
    pub index: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub rows_migrated: u64,
    pub batches: u64,
    pub shards_submitted: u64,
    pub shards_failed: u64,
    pub rate_limit_hits: u64,
    pub setup_seconds: f64,
    pub query_seconds: f64,
    pub transform_seconds: f64,
    pub dispatch_seconds: f64,
    pub total_seconds: f64,
    pub rows_per_second: i64,
}

impl MigrationReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs one table-to-index migration.
pub struct Migrator {
    source: MysqlPool,
    client: EsClient,
    options: RunOptions,
}

impl Migrator {
    pub fn new(source: MysqlPool, client: EsClient, options: RunOptions) -> Self {
        Self {
            source,
            client,
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run the migration to completion and report on it.
    pub async fn run(&self) -> Result<MigrationReport> {
        let options = &self.options;
        let started_at = Utc::now();
        info!(
            "Migrating {} into {} ({} worker(s), batch {}, limit {}, {} submit)",
            options.table,
            options.index,
            options.workers,
            options.batch_size,
            options.limit,
            options.strategy.as_str()
        );

        let mut timings = PhaseTimings::default();

        // Setup: load the schema and recreate the index from it
        let setup_start = Instant::now();
        let columns = self.source.describe(&options.table).await?;
        if columns.is_empty() {
            return Err(MigrateError::setup(
                &options.index,
                format!("table {} has no columns", options.table),
            ));
        }
        self.recreate_index(&columns).await?;
        timings.setup = setup_start.elapsed();

        let dispatcher = Dispatcher::new(self.client.clone(), options.strategy);
        let effective_batch = options.effective_batch() as i64;
        let mut cursor = BatchCursor::new(options.limit);

        let mut rows_migrated: u64 = 0;
        let mut batches: u64 = 0;
        let mut shards_submitted: u64 = 0;
        let mut shards_failed: u64 = 0;
        let mut rate_limit_hits: u64 = 0;

        while !cursor.exhausted() {
            let query_start = Instant::now();
            let rows = self
                .source
                .fetch(&options.table, &columns, cursor.offset, effective_batch)
                .await?;
            timings.query += query_start.elapsed();

            let fetched = rows.len();
            if fetched == 0 {
                break;
            }

            let transform_start = Instant::now();
            let docs =
                transform::documents(rows, fetched, &columns, &options.index, &options.doc_type);
            timings.transform += transform_start.elapsed();

            let dispatch_start = Instant::now();
            let shards = shard::plan(docs, options.workers, self.client.endpoints())?;
            let stats = dispatcher.dispatch(shards).await;
            timings.dispatch += dispatch_start.elapsed();

            shards_submitted += stats.outcomes.len() as u64;
            shards_failed += stats.failed as u64;
            rate_limit_hits += stats.rate_limit_hits() as u64;
            rows_migrated += fetched as u64;
            batches += 1;

            debug!(
                "Batch {}: {} rows from offset {}, {} shard(s), {} failed",
                batches,
                fetched,
                cursor.offset,
                stats.outcomes.len(),
                stats.failed
            );

            cursor.advance(fetched);
        }

        let completed_at = Utc::now();
        let total_seconds = timings.total().as_secs_f64();
        let rows_per_second = if total_seconds > 0.0 {
            (rows_migrated as f64 / total_seconds) as i64
        } else {
            0
        };
        let status = if shards_failed > 0 {
            "completed_with_failed_shards"
        } else {
            "completed"
        };

        info!(
            "Migration of {} finished: {} rows in {} batch(es), {} rows/s",
            options.table, rows_migrated, batches, rows_per_second
        );

        Ok(MigrationReport {
            run_id: Uuid::new_v4().to_string(),
            table: options.table.clone(),
            index: options.index.clone(),
            status: status.to_string(),
            started_at,
            completed_at,
            rows_migrated,
            batches,
            shards_submitted,
            shards_failed,
            rate_limit_hits,
            setup_seconds: timings.setup.as_secs_f64(),
            query_seconds: timings.query.as_secs_f64(),
            transform_seconds: timings.transform.as_secs_f64(),
            dispatch_seconds: timings.dispatch.as_secs_f64(),
            total_seconds,
            rows_per_second,
        })
    }

    /// Drop any existing index of the same name and create it fresh with a
    /// mapping inferred from the source schema.
    async fn recreate_index(&self, columns: &[Column]) -> Result<()> {
        let index = &self.options.index;
        if self.client.index_exists(index).await? {
            self.client.delete_index(index).await?;
        }
        let mapping = typemap::index_mapping(&self.options.doc_type, columns);
        self.client.create_index(index, &mapping).await
    }
}
