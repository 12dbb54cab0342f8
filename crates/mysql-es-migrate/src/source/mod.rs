//! MySQL source access.
//!
//! Uses SQLx for connection pooling and async query execution. Batches are
//! read with `LIMIT offset, n` in the table's natural order, so an exhausted
//! table is detected by an empty page rather than a row count.

mod value;

pub use value::{Row, SqlValue};

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Row as _, ValueRef as _};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::error::{MigrateError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Batches are fetched one at a time; a couple of spare connections cover
/// health probes issued while a migration is running.
const POOL_MAX_CONNECTIONS: u32 = 4;

/// A column as declared in INFORMATION_SCHEMA, in ordinal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

/// MySQL source pool.
#[derive(Clone)]
pub struct MysqlPool {
    pool: sqlx::MySqlPool,
    database: String,
}

impl MysqlPool {
    /// Connect to the source database and verify the connection.
    pub async fn new(config: &SourceConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(MySqlSslMode::Preferred);

        let pool = MySqlPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| MigrateError::source_db(e, "creating MySQL source pool"))?;

        // Test connection
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| MigrateError::source_db(e, "testing MySQL source connection"))?;

        info!(
            "Connected to MySQL source: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self {
            pool,
            database: config.database.clone(),
        })
    }

    /// Test the database connection.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MigrateError::source_db(e, "pinging MySQL source"))?;
        Ok(())
    }

    /// List base tables in the configured database.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        // CAST to CHAR to handle collation differences
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MigrateError::source_db(e, "listing MySQL tables"))?;

        Ok(rows
            .iter()
            .map(|row| row.get::<String, _>("TABLE_NAME"))
            .collect())
    }

    /// Load column names and declared types for a table, in ordinal order.
    pub async fn describe(&self, table: &str) -> Result<Vec<Column>> {
        let query = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
                CAST(DATA_TYPE AS CHAR(255)) AS DATA_TYPE
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(&self.database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MigrateError::source_db(e, "loading MySQL columns"))?;

        Ok(rows
            .iter()
            .map(|row| Column {
                name: row.get::<String, _>("COLUMN_NAME"),
                data_type: row.get::<String, _>("DATA_TYPE"),
            })
            .collect())
    }

    /// Count the rows in a table.
    pub async fn count(&self, table: &str) -> Result<i64> {
        let query = format!("SELECT COUNT(*) AS n FROM {}", quote_ident(table));
        let row: MySqlRow = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MigrateError::source_db(e, "counting rows"))?;
        Ok(row.get::<i64, _>("n"))
    }

    /// Fetch one page of rows in natural order.
    ///
    /// Returns fewer than `batch` rows (possibly zero) once the table is
    /// exhausted; zero rows is the caller's termination signal.
    pub async fn fetch(
        &self,
        table: &str,
        columns: &[Column],
        offset: i64,
        batch: i64,
    ) -> Result<Vec<Row>> {
        let query = batch_query(table, offset, batch);
        let rows: Vec<MySqlRow> = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MigrateError::source_db(e, "fetching batch"))?;

        debug!(offset, rows = rows.len(), "Fetched batch from {}", table);

        Ok(rows.iter().map(|row| decode_row(row, columns)).collect())
    }
}

/// Build the paging query for one batch.
fn batch_query(table: &str, offset: i64, batch: i64) -> String {
    format!(
        "SELECT * FROM {} LIMIT {}, {}",
        quote_ident(table),
        offset,
        batch
    )
}

/// Quote a MySQL identifier.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Convert a MySQL row to an SqlValue vector, decoding each cell by its
/// declared column type.
fn decode_row(row: &MySqlRow, columns: &[Column]) -> Row {
    columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let data_type = col.data_type.to_lowercase();

            // Handle NULL values
            let is_null: bool = row.try_get_raw(i).map(|r| r.is_null()).unwrap_or(true);
            if is_null {
                return SqlValue::Null;
            }

            // Convert based on data type
            match data_type.as_str() {
                // Integer types
                "tinyint" => row
                    .try_get::<i8, _>(i)
                    .map(|v| SqlValue::Int(v as i64))
                    .unwrap_or(SqlValue::Null),
                "smallint" => row
                    .try_get::<i16, _>(i)
                    .map(|v| SqlValue::Int(v as i64))
                    .unwrap_or(SqlValue::Null),
                "mediumint" | "int" | "integer" => row
                    .try_get::<i32, _>(i)
                    .map(|v| SqlValue::Int(v as i64))
                    .unwrap_or(SqlValue::Null),
                "bigint" => row
                    .try_get::<i64, _>(i)
                    .map(SqlValue::Int)
                    .unwrap_or(SqlValue::Null),

                // Floating point
                "float" => row
                    .try_get::<f32, _>(i)
                    .map(|v| SqlValue::Float(v as f64))
                    .unwrap_or(SqlValue::Null),
                "double" | "real" => row
                    .try_get::<f64, _>(i)
                    .map(SqlValue::Float)
                    .unwrap_or(SqlValue::Null),

                // Decimal
                "decimal" | "numeric" => row
                    .try_get::<rust_decimal::Decimal, _>(i)
                    .map(SqlValue::Decimal)
                    .unwrap_or(SqlValue::Null),

                // Boolean
                "bit" | "boolean" | "bool" => row
                    .try_get::<bool, _>(i)
                    .map(SqlValue::Bool)
                    .unwrap_or(SqlValue::Null),

                // Binary types
                "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => row
                    .try_get::<Vec<u8>, _>(i)
                    .map(SqlValue::Bytes)
                    .unwrap_or(SqlValue::Null),

                // Date/Time types
                "date" => row
                    .try_get::<chrono::NaiveDate, _>(i)
                    .map(SqlValue::Date)
                    .unwrap_or(SqlValue::Null),
                "time" => row
                    .try_get::<chrono::NaiveTime, _>(i)
                    .map(SqlValue::Time)
                    .unwrap_or(SqlValue::Null),
                "datetime" | "timestamp" => row
                    .try_get::<chrono::NaiveDateTime, _>(i)
                    .map(SqlValue::DateTime)
                    .unwrap_or(SqlValue::Null),

                // Everything else (char/varchar/text family, enum, set, json)
                // is carried as text
                _ => row
                    .try_get::<String, _>(i)
                    .map(SqlValue::Text)
                    .unwrap_or(SqlValue::Null),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("users"), "`users`");
        assert_eq!(quote_ident("weird`name"), "`weird``name`");
    }

    #[test]
    fn test_batch_query_uses_offset_comma_count() {
        assert_eq!(
            batch_query("logs", 40, 20),
            "SELECT * FROM `logs` LIMIT 40, 20"
        );
        assert_eq!(batch_query("logs", 0, 5000), "SELECT * FROM `logs` LIMIT 0, 5000");
    }
}
