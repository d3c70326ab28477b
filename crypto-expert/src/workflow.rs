use std::sync::Arc;

use serde_json::Map;
use tracing::info;

use common::AgentError;

use crate::cache::{CacheStore, DEFAULT_SEARCH_LIMIT, DEFAULT_SOURCE, SIMILARITY_THRESHOLD};
use crate::models::AgentReply;
use crate::orchestrator::Orchestrator;
use crate::tools::ToolRegistry;

/// Drives the four-state retrieval protocol per query: the cache check
/// always runs before any fetch, a store happens only on the fresh-fetch
/// path, and a cached hit never writes. `respond` is the only entry point,
/// so the ordering holds structurally rather than by instruction.
pub struct ExpertWorkflow {
    cache: Arc<CacheStore>,
    registry: ToolRegistry,
    orchestrator: Arc<dyn Orchestrator>,
    threshold: f64,
}

impl ExpertWorkflow {
    pub fn new(
        cache: Arc<CacheStore>,
        registry: ToolRegistry,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Self {
        Self {
            cache,
            registry,
            orchestrator,
            threshold: SIMILARITY_THRESHOLD,
        }
    }

    pub async fn respond(&self, query: &str) -> Result<AgentReply, AgentError> {
        let topic = self.orchestrator.infer_topic(query).await?;

        // CheckCache
        let outcome = self.cache.search(&topic, DEFAULT_SEARCH_LIMIT).await?;

        // Decision: the store returns sub-threshold hits too; the accept
        // rule lives here.
        let usable: Vec<_> = outcome
            .results
            .into_iter()
            .filter(|hit| hit.score >= self.threshold)
            .collect();

        if !usable.is_empty() {
            info!(topic = %topic, hits = usable.len(), "serving from cache");
            let response = self.orchestrator.summarize_cached(query, &usable).await?;
            return Ok(AgentReply {
                response,
                topic,
                from_cache: true,
            });
        }

        // FetchFresh
        let response = self.orchestrator.research(query, &self.registry).await?;

        // StoreResult: a failed write is fatal for the request, but nothing
        // already produced gets rolled back.
        self.cache
            .upsert(&response, &topic, DEFAULT_SOURCE, Map::new())
            .await?;

        Ok(AgentReply {
            response,
            topic,
            from_cache: false,
        })
    }
}
