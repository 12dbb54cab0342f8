//! Elasticsearch destination access.
//!
//! One client holds the whole endpoint group. Index administration and
//! queries go through the group's first endpoint; bulk writes are addressed
//! per call so the dispatcher can spread shards across the group.

mod types;

pub use types::{BulkReply, BulkResponse, ClusterHealth, CountResponse};

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

use crate::config::DestinationConfig;
use crate::error::{MigrateError, Result};
use crate::transform::BulkAction;

const NDJSON: &str = "application/x-ndjson";

/// Elasticsearch client bound to one endpoint group.
#[derive(Debug, Clone)]
pub struct EsClient {
    http: Client,
    endpoints: Vec<Url>,
}

impl EsClient {
    /// Build a client over an ordered, non-empty endpoint group.
    pub fn new(endpoints: Vec<Url>, timeout: Duration) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(MigrateError::Config(
                "at least one destination endpoint is required".into(),
            ));
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mysql-es-migrate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, endpoints })
    }

    /// Build a client for the selected connection group.
    pub fn from_config(config: &DestinationConfig, group: &str) -> Result<Self> {
        let endpoints = config.endpoints(group)?;
        info!(
            "Using destination group '{}' with {} endpoint(s)",
            group,
            endpoints.len()
        );
        Self::new(
            endpoints,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// The full endpoint group, in configured order.
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// Endpoint used for index administration and queries.
    pub fn primary(&self) -> &Url {
        &self.endpoints[0]
    }

    /// Check whether an index exists.
    pub async fn index_exists(&self, index: &str) -> Result<bool> {
        let url = index_url(self.primary(), index)?;
        let resp = self.http.head(url).send().await?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(MigrateError::setup(
                index,
                format!("existence check returned {}", status),
            )),
        }
    }

    /// Delete an index. Deleting an absent index is not an error.
    pub async fn delete_index(&self, index: &str) -> Result<()> {
        let url = index_url(self.primary(), index)?;
        let resp = self.http.delete(url).send().await?;
        let status = resp.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            info!("Deleted index {}", index);
            Ok(())
        } else {
            Err(MigrateError::setup(
                index,
                format!("delete returned {}", status),
            ))
        }
    }

    /// Create an index with the given mapping body. An already-existing
    /// index is tolerated, matching the delete-then-create setup flow.
    pub async fn create_index(&self, index: &str, mapping: &Value) -> Result<()> {
        let url = index_url(self.primary(), index)?;
        let resp = self.http.put(url).json(mapping).send().await?;
        let status = resp.status();
        if status.is_success() || status == StatusCode::BAD_REQUEST {
            info!("Created index {}", index);
            Ok(())
        } else {
            Err(MigrateError::setup(
                index,
                format!("create returned {}", status),
            ))
        }
    }

    /// Count documents in an index.
    pub async fn count(&self, index: &str) -> Result<i64> {
        let url = self.primary().join(&format!("{}/_count", index))?;
        let resp = self.http.get(url).send().await?.error_for_status()?;
        let body: CountResponse = resp.json().await?;
        Ok(body.count)
    }

    /// Fetch cluster health from the primary endpoint.
    pub async fn cluster_health(&self) -> Result<ClusterHealth> {
        let url = self.primary().join("_cluster/health")?;
        let resp = self.http.get(url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Submit structured actions to an endpoint's `_bulk` entry point.
    ///
    /// Rejections other than 429 are errors here, so a misaddressed or
    /// broken request surfaces instead of being counted as throughput.
    pub async fn bulk(&self, endpoint: &Url, actions: &[BulkAction]) -> Result<BulkReply> {
        let url = endpoint.join("_bulk")?;
        let body = expand_actions(actions);
        debug!(actions = actions.len(), %url, "Submitting structured bulk");

        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, NDJSON)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(BulkReply {
                status,
                took_ms: None,
                errors: false,
            });
        }
        if !status.is_success() {
            return Err(MigrateError::shard(
                endpoint,
                format!("bulk returned {}", status),
            ));
        }

        let parsed: BulkResponse = resp.json().await?;
        Ok(BulkReply {
            status,
            took_ms: Some(parsed.took),
            errors: parsed.errors,
        })
    }

    /// POST a pre-serialized NDJSON body to `{index}/_bulk` on an endpoint.
    ///
    /// Status is reported, never raised: the caller decides what a non-2xx
    /// means. The body is not read.
    pub async fn bulk_raw(&self, endpoint: &Url, index: &str, body: String) -> Result<BulkReply> {
        let url = endpoint.join(&format!("{}/_bulk", index))?;
        debug!(bytes = body.len(), %url, "Submitting raw bulk");

        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, NDJSON)
            .body(body)
            .send()
            .await?;

        Ok(BulkReply {
            status: resp.status(),
            took_ms: None,
            errors: false,
        })
    }
}

/// Join an index name onto a group endpoint.
fn index_url(endpoint: &Url, index: &str) -> Result<Url> {
    Ok(endpoint.join(index)?)
}

/// Expand structured actions into the header/source line pairs the bulk
/// endpoint actually accepts.
fn expand_actions(actions: &[BulkAction]) -> String {
    let mut lines = Vec::with_capacity(actions.len() * 2);
    for action in actions {
        lines.push(json!({"index": {"_index": action.index, "_type": action.doc_type}}).to_string());
        lines.push(Value::Object(action.source.clone()).to_string());
    }
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_index_url_joins_under_endpoint() {
        let base = Url::parse("http://es1.internal:9200/").unwrap();
        assert_eq!(
            index_url(&base, "logs_index").unwrap().as_str(),
            "http://es1.internal:9200/logs_index"
        );
    }

    #[test]
    fn test_expand_actions_matches_flat_encoding() {
        let mut source = Map::new();
        source.insert("id".to_string(), Value::String("1".to_string()));
        let actions = vec![BulkAction {
            index: "logs_index".to_string(),
            doc_type: "record".to_string(),
            source,
        }];

        let body = expand_actions(&actions);
        let lines: Vec<&str> = body.trim_end_matches('\n').split('\n').collect();
        assert_eq!(lines.len(), 2);

        let header: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(header["index"]["_index"], "logs_index");
        assert_eq!(header["index"]["_type"], "record");

        let content: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(content["id"], "1");
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn test_client_requires_endpoints() {
        assert!(EsClient::new(Vec::new(), Duration::from_secs(1)).is_err());
    }
}
