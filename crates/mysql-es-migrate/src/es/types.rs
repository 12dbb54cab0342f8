//! Elasticsearch wire types.

use reqwest::StatusCode;
use serde::Deserialize;

/// Body of a `_bulk` response.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub errors: bool,
}

/// Body of a `_count` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Subset of `_cluster/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub number_of_nodes: u32,
}

/// What one bulk call came back with, however it was submitted.
#[derive(Debug, Clone)]
pub struct BulkReply {
    pub status: StatusCode,
    /// Server-side processing time, when the body was read.
    pub took_ms: Option<u64>,
    /// True when the body reported per-item failures.
    pub errors: bool,
}

impl BulkReply {
    /// True when the destination signalled it is overloaded.
    pub fn rate_limited(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
    }
}
