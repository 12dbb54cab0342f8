//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(MigrateError::Config("source.host is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(MigrateError::Config("source.database is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(MigrateError::Config("source.user is required".into()));
    }
    if config.source.port == 0 {
        return Err(MigrateError::Config("source.port must be non-zero".into()));
    }

    // Destination validation
    if config.destination.connections.is_empty() {
        return Err(MigrateError::Config(
            "destination.connections must define at least one group".into(),
        ));
    }
    if config.destination.port == 0 {
        return Err(MigrateError::Config(
            "destination.port must be non-zero".into(),
        ));
    }
    match config.destination.scheme.as_str() {
        "http" | "https" => {}
        other => {
            return Err(MigrateError::Config(format!(
                "destination.scheme must be 'http' or 'https', got '{}'",
                other
            )));
        }
    }
    // The default group must resolve; --connection overrides are checked at use
    config
        .destination
        .endpoints(&config.destination.connection)?;

    // Migration config validation - only check if explicitly set
    if let Some(0) = config.migration.workers {
        return Err(MigrateError::Config(
            "migration.workers must be at least 1".into(),
        ));
    }
    if let Some(0) = config.migration.batch_size {
        return Err(MigrateError::Config(
            "migration.batch_size must be at least 1".into(),
        ));
    }
    if let Some(limit) = config.migration.limit {
        if limit < 1 {
            return Err(MigrateError::Config(
                "migration.limit must be at least 1".into(),
            ));
        }
    }
    if config.migration.doc_type.is_empty() {
        return Err(MigrateError::Config(
            "migration.doc_type must not be empty".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DestinationConfig, MigrationConfig, SourceConfig};
    use std::collections::BTreeMap;

    fn valid_config() -> Config {
        let mut connections = BTreeMap::new();
        connections.insert("standalone".to_string(), vec!["localhost".to_string()]);
        connections.insert(
            "cluster".to_string(),
            vec!["es1.internal".to_string(), "es2.internal".to_string()],
        );

        Config {
            source: SourceConfig {
                host: "localhost".to_string(),
                port: 3306,
                database: "source_db".to_string(),
                user: "root".to_string(),
                password: "password".to_string(),
            },
            destination: DestinationConfig {
                connections,
                connection: "cluster".to_string(),
                port: 9200,
                scheme: "http".to_string(),
                request_timeout_secs: 60,
            },
            migration: MigrationConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_source_host() {
        let mut config = valid_config();
        config.source.host = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_connection_map() {
        let mut config = valid_config();
        config.destination.connections.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_default_group() {
        let mut config = valid_config();
        config.destination.connection = "missing".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_group_with_no_hosts() {
        let mut config = valid_config();
        config
            .destination
            .connections
            .insert("cluster".to_string(), Vec::new());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_scheme() {
        let mut config = valid_config();
        config.destination.scheme = "ftp".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_workers() {
        let mut config = valid_config();
        config.migration.workers = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_batch_size() {
        let mut config = valid_config();
        config.migration.batch_size = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_limit() {
        let mut config = valid_config();
        config.migration.limit = Some(-5);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_source_config_debug_redacts_password() {
        let mut config = valid_config();
        config.source.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config.source);
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
        assert!(
            !debug_output.contains("super_secret_password_123"),
            "Debug output should not contain actual password value"
        );
    }

    #[test]
    fn test_endpoint_order_preserved() {
        let config = valid_config();
        let endpoints = config.destination.endpoints("cluster").unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].as_str(), "http://es1.internal:9200/");
        assert_eq!(endpoints[1].as_str(), "http://es2.internal:9200/");
    }
}
