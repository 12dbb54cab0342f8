//! Post-migration verification and connectivity checks.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::error::Result;
use crate::es::EsClient;
use crate::source::MysqlPool;

/// Row-for-document count comparison between a table and its index.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub table: String,
    pub index: String,
    pub source_rows: i64,
    pub destination_docs: i64,
    pub matched: bool,
}

/// Compare the source table's row count with the destination index's
/// document count. The destination count is eventually consistent, so a
/// mismatch right after a run may only mean a pending refresh.
pub async fn verify_counts(
    source: &MysqlPool,
    client: &EsClient,
    table: &str,
    index: &str,
) -> Result<VerifyReport> {
    let source_rows = source.count(table).await?;
    let destination_docs = client.count(index).await?;
    let matched = source_rows == destination_docs;

    if matched {
        info!("Counts match: {} rows in {} and {}", source_rows, table, index);
    } else {
        warn!(
            "Count mismatch: {} has {} rows but {} has {} documents",
            table, source_rows, index, destination_docs
        );
    }

    Ok(VerifyReport {
        table: table.to_string(),
        index: index.to_string(),
        source_rows,
        destination_docs,
        matched,
    })
}

/// Connectivity report for both ends of a migration.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub source_connected: bool,
    pub source_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    pub destination_connected: bool,
    pub destination_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_status: Option<String>,
    pub healthy: bool,
}

/// Probe both sides and report what answered. Probe failures land in the
/// report rather than propagating, so this always comes back with a verdict.
pub async fn health_check(source_config: &SourceConfig, client: &EsClient) -> HealthReport {
    let source_start = Instant::now();
    let (source_connected, source_latency_ms, source_error) =
        match MysqlPool::new(source_config).await {
            Ok(_) => (true, Some(source_start.elapsed().as_millis() as u64), None),
            Err(e) => (false, None, Some(e.to_string())),
        };

    let destination_start = Instant::now();
    let (destination_connected, destination_latency_ms, destination_error, cluster_status) =
        match client.cluster_health().await {
            Ok(health) => (
                true,
                Some(destination_start.elapsed().as_millis() as u64),
                None,
                Some(health.status),
            ),
            Err(e) => (false, None, Some(e.to_string()), None),
        };

    HealthReport {
        source_connected,
        source_latency_ms,
        source_error,
        destination_connected,
        destination_latency_ms,
        destination_error,
        cluster_status,
        healthy: source_connected && destination_connected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_report_serializes_mismatch() {
        let report = VerifyReport {
            table: "events".to_string(),
            index: "events_index".to_string(),
            source_rows: 100,
            destination_docs: 97,
            matched: false,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["source_rows"], 100);
        assert_eq!(json["destination_docs"], 97);
        assert_eq!(json["matched"], false);
    }

    #[test]
    fn test_health_report_omits_absent_errors() {
        let report = HealthReport {
            source_connected: true,
            source_latency_ms: Some(12),
            source_error: None,
            destination_connected: false,
            destination_latency_ms: None,
            destination_error: Some("connection refused".to_string()),
            cluster_status: None,
            healthy: false,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("source_error").is_none());
        assert_eq!(json["destination_error"], "connection refused");
        assert_eq!(json["healthy"], false);
    }
}
