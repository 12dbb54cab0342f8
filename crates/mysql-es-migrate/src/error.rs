//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error
    #[error("Source database error: {message}")]
    Source {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// Destination index setup failed (mapping, delete, create)
    #[error("Setup failed for index {index}: {message}")]
    Setup { index: String, message: String },

    /// A single shard submission failed. Non-fatal: logged by the
    /// dispatcher and excluded from outcomes, never propagated upward.
    #[error("Shard submission failed on {endpoint}: {message}")]
    Shard { endpoint: String, message: String },

    /// Destination HTTP transport error
    #[error("Destination HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid destination endpoint URL
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Source error with context about where it occurred
    pub fn source_db(err: sqlx::Error, context: impl Into<String>) -> Self {
        MigrateError::Source {
            message: context.into(),
            source: err,
        }
    }

    /// Create a Setup error
    pub fn setup(index: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Setup {
            index: index.into(),
            message: message.into(),
        }
    }

    /// Create a Shard error
    pub fn shard(endpoint: impl ToString, message: impl Into<String>) -> Self {
        MigrateError::Shard {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) => 1,
            MigrateError::Source { .. } => 2,
            MigrateError::Setup { .. } => 3,
            MigrateError::Http(_) | MigrateError::Url(_) | MigrateError::Shard { .. } => 4,
            MigrateError::Json(_) => 5,
            MigrateError::Io(_) => 7,
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::Config("bad".into()).exit_code(), 1);
        assert_eq!(MigrateError::setup("t_index", "create failed").exit_code(), 3);
        assert_eq!(MigrateError::shard("http://es1:9200/", "timeout").exit_code(), 4);
        let io = MigrateError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.exit_code(), 7);
    }

    #[test]
    fn test_format_detailed_includes_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = MigrateError::Io(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error"));
    }

    #[test]
    fn test_shard_error_message() {
        let err = MigrateError::shard("http://es1:9200/", "connection reset");
        assert_eq!(
            err.to_string(),
            "Shard submission failed on http://es1:9200/: connection reset"
        );
    }
}
