//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

/// Starter configuration written by `init`.
pub fn sample_yaml() -> &'static str {
    r#"# MySQL source database
source:
  host: localhost
  port: 3306
  database: my_database
  user: root
  password: ""

# Elasticsearch destination
destination:
  # Named endpoint groups; select one with `connection` or --connection
  connections:
    standalone:
      - localhost
    cluster:
      - es1.internal
      - es2.internal
      - es3.internal
  connection: standalone
  port: 9200
  scheme: http
  request_timeout_secs: 60

# Migration defaults (all optional, overridable from the command line)
migration:
  # table: my_table
  # index: my_table_index
  batch_size: 5000
  workers: 1
  limit: 20000
  doc_type: record
"#
}
