//! Throughput benchmarks.
//!
//! Both sweeps drive complete migration runs, index recreation included, so
//! successive samples start from the same destination state. The batch-size
//! sweep walks a doubling ladder with a single worker and a budget of one
//! batch per run; the worker sweep holds batch and limit at their configured
//! values and varies only the worker count.

use serde::Serialize;
use tracing::info;

use crate::config::MigrationConfig;
use crate::dispatch::SubmitStrategy;
use crate::error::Result;
use crate::es::EsClient;
use crate::migrate::{Migrator, RunOptions};
use crate::source::MysqlPool;

/// Which parameter a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchKind {
    BatchSize,
    Workers,
}

impl BenchKind {
    fn label(&self) -> &'static str {
        match self {
            BenchKind::BatchSize => "batch_size",
            BenchKind::Workers => "workers",
        }
    }
}

/// One complete migration run at one parameter value.
#[derive(Debug, Clone, Serialize)]
pub struct BenchSample {
    pub parameter: u64,
    pub rows: u64,
    pub seconds: f64,
    pub rows_per_second: i64,
}

/// Results of one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub kind: BenchKind,
    pub table: String,
    pub samples: Vec<BenchSample>,
}

impl BenchReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text table for terminal output.
    pub fn render(&self) -> String {
        let label = self.kind.label();
        let mut out = format!("Benchmark sweep: {} over {}\n", label, self.table);
        out.push_str(&format!(
            "  {:>12} {:>12} {:>10} {:>12}\n",
            label, "rows", "seconds", "rows/s"
        ));
        for sample in &self.samples {
            out.push_str(&format!(
                "  {:>12} {:>12} {:>10.2} {:>12}\n",
                sample.parameter, sample.rows, sample.seconds, sample.rows_per_second
            ));
        }
        out
    }
}

/// Batch sizes swept by `benchmark_batch_sizes`: 100 doubled per step.
fn size_ladder(low: u32, high: u32) -> Vec<usize> {
    (low..=high).map(|i| 100usize << i).collect()
}

/// Sweep batch sizes 100*2^low ..= 100*2^high with one worker, budgeting
/// exactly one batch per run.
pub async fn benchmark_batch_sizes(
    source: &MysqlPool,
    client: &EsClient,
    table: &str,
    config: &MigrationConfig,
    low: u32,
    high: u32,
) -> Result<BenchReport> {
    let mut samples = Vec::new();
    for batch in size_ladder(low, high) {
        info!("Benchmarking batch size {}", batch);
        let mut options = RunOptions::new(table, config, SubmitStrategy::Structured);
        options.batch_size = batch;
        options.workers = 1;
        options.limit = batch as i64;

        let report = Migrator::new(source.clone(), client.clone(), options)
            .run()
            .await?;
        samples.push(BenchSample {
            parameter: batch as u64,
            rows: report.rows_migrated,
            seconds: report.total_seconds,
            rows_per_second: report.rows_per_second,
        });
    }

    Ok(BenchReport {
        kind: BenchKind::BatchSize,
        table: table.to_string(),
        samples,
    })
}

/// Sweep worker counts low ..= high at the configured batch size and limit,
/// submitting raw NDJSON the way the parallel path does.
pub async fn benchmark_workers(
    source: &MysqlPool,
    client: &EsClient,
    table: &str,
    config: &MigrationConfig,
    low: u32,
    high: u32,
) -> Result<BenchReport> {
    let mut samples = Vec::new();
    for workers in low..=high {
        info!("Benchmarking {} worker(s)", workers);
        let mut options = RunOptions::new(table, config, SubmitStrategy::Raw);
        options.workers = workers as usize;

        let report = Migrator::new(source.clone(), client.clone(), options)
            .run()
            .await?;
        samples.push(BenchSample {
            parameter: workers as u64,
            rows: report.rows_migrated,
            seconds: report.total_seconds,
            rows_per_second: report.rows_per_second,
        });
    }

    Ok(BenchReport {
        kind: BenchKind::Workers,
        table: table.to_string(),
        samples,
    })
}
