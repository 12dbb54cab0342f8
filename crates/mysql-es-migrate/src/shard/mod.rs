//! Batch sharding.
//!
//! A batch of documents is split into contiguous, near-equal shards, one per
//! worker, and each shard is pinned to a destination endpoint by round-robin
//! over the configured endpoint group.

use url::Url;

use crate::error::{MigrateError, Result};
use crate::transform::Document;

/// A contiguous slice of one batch, bound to one worker and one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Shard {
    pub worker: usize,
    pub endpoint: Url,
    pub docs: Vec<Document>,
}

/// Split documents into up to `workers` contiguous shards.
///
/// Shards hold `ceil(docs / workers)` documents each, except the last which
/// takes the remainder. When there are fewer documents than workers the
/// trailing workers get nothing and no shard is produced for them. Endpoint
/// assignment cycles the group in shard order regardless of shard size, so
/// load spreads across nodes even when workers outnumber endpoints.
pub fn plan(docs: Vec<Document>, workers: usize, endpoints: &[Url]) -> Result<Vec<Shard>> {
    if workers == 0 {
        return Err(MigrateError::Config(
            "migration.workers must be at least 1".into(),
        ));
    }
    if endpoints.is_empty() {
        return Err(MigrateError::Config(
            "no destination endpoints to shard across".into(),
        ));
    }
    if docs.is_empty() {
        return Ok(Vec::new());
    }

    let chunk = docs.len().div_ceil(workers);
    let mut shards = Vec::with_capacity(workers);
    let mut remaining = docs;
    let mut worker = 0;

    while !remaining.is_empty() {
        let take = chunk.min(remaining.len());
        let rest = remaining.split_off(take);
        shards.push(Shard {
            worker,
            endpoint: endpoints[worker % endpoints.len()].clone(),
            docs: remaining,
        });
        remaining = rest;
        worker += 1;
    }

    Ok(shards)
}
