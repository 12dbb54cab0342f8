//! Configuration type definitions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MigrateError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration (MySQL).
    pub source: SourceConfig,

    /// Destination cluster configuration (Elasticsearch).
    pub destination: DestinationConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Source database (MySQL) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Destination cluster (Elasticsearch) configuration.
///
/// Endpoints are organized into named connection groups; one group is
/// selected per run (config default or `--connection` override). Bulk
/// traffic round-robins over the selected group's hosts in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Named endpoint groups, each an ordered host list.
    pub connections: BTreeMap<String, Vec<String>>,

    /// Group used when the command line does not select one.
    #[serde(default = "default_connection")]
    pub connection: String,

    /// HTTP port of every node (default: 9200).
    #[serde(default = "default_es_port")]
    pub port: u16,

    /// URL scheme (default: "http").
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Per-request timeout for bulk and admin calls (default: 60).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl DestinationConfig {
    /// Resolve the ordered endpoint URLs for a connection group.
    pub fn endpoints(&self, group: &str) -> Result<Vec<Url>> {
        let hosts = self.connections.get(group).ok_or_else(|| {
            MigrateError::Config(format!("unknown connection group '{}'", group))
        })?;
        if hosts.is_empty() {
            return Err(MigrateError::Config(format!(
                "connection group '{}' has no hosts",
                group
            )));
        }
        hosts
            .iter()
            .map(|host| {
                Url::parse(&format!("{}://{}:{}/", self.scheme, host, self.port))
                    .map_err(MigrateError::from)
            })
            .collect()
    }
}

/// Migration behavior configuration.
/// Tunable fields use Option<T> so subcommands can tell "not set" (apply
/// the subcommand's default) from "explicitly set in the file".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Table to migrate when the command line does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Rows per bulk call, per worker (default: 5000).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Concurrent bulk-call workers (default: 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Total row budget for one run (default: 20000).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,

    /// Document type name in the destination index (default: "record").
    #[serde(default = "default_doc_type")]
    pub doc_type: String,

    /// Destination index name override. Defaults to `<table>_index`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            table: None,
            batch_size: None,
            workers: None,
            limit: None,
            doc_type: default_doc_type(),
            index: None,
        }
    }
}

impl MigrationConfig {
    // Accessor methods that return the effective value (with fallback defaults)

    pub fn get_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(5000)
    }

    pub fn get_workers(&self) -> usize {
        self.workers.unwrap_or(1)
    }

    pub fn get_limit(&self) -> i64 {
        self.limit.unwrap_or(20_000)
    }

    /// Destination index name for a table.
    pub fn index_name(&self, table: &str) -> String {
        self.index
            .clone()
            .unwrap_or_else(|| format!("{}_index", table))
    }

    /// Table named on the command line, falling back to the config file.
    pub fn resolve_table(&self, cli_table: Option<String>) -> Result<String> {
        cli_table.or_else(|| self.table.clone()).ok_or_else(|| {
            MigrateError::Config(
                "no table specified: pass --table or set migration.table".to_string(),
            )
        })
    }
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_connection() -> String {
    "cluster".to_string()
}

fn default_es_port() -> u16 {
    9200
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_doc_type() -> String {
    "record".to_string()
}
