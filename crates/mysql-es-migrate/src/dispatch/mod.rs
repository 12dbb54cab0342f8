//! Concurrent shard submission.
//!
//! Every shard of a batch is submitted in its own task and the batch is
//! joined before the next fetch. A failing shard is logged and excluded
//! from the outcomes; it never aborts its siblings. 429 replies are
//! collected as advisory rate-limit flags, with retry left to the caller.

use futures::future::join_all;
use tracing::warn;
use url::Url;

use crate::error::{MigrateError, Result};
use crate::es::EsClient;
use crate::shard::Shard;
use crate::transform;

/// How a shard's documents are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStrategy {
    /// Structured action objects through the checked bulk call.
    Structured,
    /// Pre-serialized NDJSON posted straight at the index.
    Raw,
}

impl SubmitStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitStrategy::Structured => "structured",
            SubmitStrategy::Raw => "raw",
        }
    }
}

/// Completion record for one shard call.
#[derive(Debug, Clone)]
pub struct ShardOutcome {
    pub worker: usize,
    pub endpoint: Url,
    pub docs: usize,
    pub took_ms: Option<u64>,
    pub rate_limited: bool,
    pub had_errors: bool,
}

/// What a batch's dispatch came back with.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Completions, in join order. Failed shards are not represented here.
    pub outcomes: Vec<ShardOutcome>,
    /// Shard calls that errored instead of completing.
    pub failed: usize,
}

impl DispatchStats {
    fn absorb(&mut self, result: Result<ShardOutcome>) {
        match result {
            Ok(outcome) => {
                if outcome.rate_limited {
                    warn!(
                        "Endpoint {} answered 429 for worker {}; destination is overloaded",
                        outcome.endpoint, outcome.worker
                    );
                }
                if outcome.had_errors {
                    warn!(
                        "Bulk reply from {} reported item-level errors",
                        outcome.endpoint
                    );
                }
                self.outcomes.push(outcome);
            }
            Err(e) => {
                warn!("Shard submission failed: {}", e);
                self.failed += 1;
            }
        }
    }

    /// Number of completed shards that were rate limited.
    pub fn rate_limit_hits(&self) -> usize {
        self.outcomes.iter().filter(|o| o.rate_limited).count()
    }
}

/// Submits planned shards and collects their outcomes.
pub struct Dispatcher {
    client: EsClient,
    strategy: SubmitStrategy,
}

impl Dispatcher {
    pub fn new(client: EsClient, strategy: SubmitStrategy) -> Self {
        Self { client, strategy }
    }

    pub fn strategy(&self) -> SubmitStrategy {
        self.strategy
    }

    /// Fan a batch's shards out concurrently and wait for all of them.
    pub async fn dispatch(&self, shards: Vec<Shard>) -> DispatchStats {
        let mut handles = Vec::with_capacity(shards.len());
        for shard in shards {
            let client = self.client.clone();
            let strategy = self.strategy;
            let endpoint = shard.endpoint.clone();
            handles.push((endpoint, tokio::spawn(submit_shard(client, strategy, shard))));
        }

        let mut stats = DispatchStats::default();
        let (endpoints, tasks): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        for (endpoint, joined) in endpoints.into_iter().zip(join_all(tasks).await) {
            match joined {
                Ok(result) => stats.absorb(result),
                Err(e) => stats.absorb(Err(MigrateError::shard(
                    endpoint,
                    format!("worker task did not complete: {}", e),
                ))),
            }
        }
        stats
    }
}

/// One blocking bulk call for one shard.
async fn submit_shard(
    client: EsClient,
    strategy: SubmitStrategy,
    shard: Shard,
) -> Result<ShardOutcome> {
    let docs = shard.docs.len();
    let reply = match strategy {
        SubmitStrategy::Structured => {
            let actions = transform::bulk_actions(shard.docs);
            client.bulk(&shard.endpoint, &actions).await?
        }
        SubmitStrategy::Raw => {
            // A shard's documents all target one index; address the post at it
            let index = match shard.docs.first() {
                Some(doc) => doc.index.clone(),
                None => {
                    return Ok(ShardOutcome {
                        worker: shard.worker,
                        endpoint: shard.endpoint,
                        docs: 0,
                        took_ms: None,
                        rate_limited: false,
                        had_errors: false,
                    })
                }
            };
            let body = transform::ndjson_body(&transform::ndjson_pairs(&shard.docs));
            client.bulk_raw(&shard.endpoint, &index, body).await?
        }
    };

    Ok(ShardOutcome {
        worker: shard.worker,
        endpoint: shard.endpoint,
        docs,
        took_ms: reply.took_ms,
        rate_limited: reply.rate_limited(),
        had_errors: reply.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn outcome(worker: usize, rate_limited: bool) -> ShardOutcome {
        ShardOutcome {
            worker,
            endpoint: Url::parse("http://es1:9200/").unwrap(),
            docs: 10,
            took_ms: Some(5),
            rate_limited,
            had_errors: false,
        }
    }

    #[test]
    fn test_failed_shard_excluded_without_aborting_siblings() {
        let mut stats = DispatchStats::default();
        stats.absorb(Ok(outcome(0, false)));
        stats.absorb(Err(MigrateError::shard("http://es2:9200/", "connection reset")));
        stats.absorb(Ok(outcome(2, false)));

        assert_eq!(stats.outcomes.len(), 2);
        assert_eq!(stats.failed, 1);
        let workers: Vec<usize> = stats.outcomes.iter().map(|o| o.worker).collect();
        assert_eq!(workers, vec![0, 2]);
    }

    #[test]
    fn test_rate_limit_hits_counted_not_fatal() {
        let mut stats = DispatchStats::default();
        stats.absorb(Ok(outcome(0, true)));
        stats.absorb(Ok(outcome(1, false)));
        stats.absorb(Ok(outcome(2, true)));

        assert_eq!(stats.failed, 0);
        assert_eq!(stats.rate_limit_hits(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_of_no_shards_is_a_no_op() {
        let client = EsClient::new(
            vec![Url::parse("http://127.0.0.1:9200/").unwrap()],
            Duration::from_secs(1),
        )
        .unwrap();
        let dispatcher = Dispatcher::new(client, SubmitStrategy::Raw);

        let stats = dispatcher.dispatch(Vec::new()).await;
        assert!(stats.outcomes.is_empty());
        assert_eq!(stats.failed, 0);
    }
}
