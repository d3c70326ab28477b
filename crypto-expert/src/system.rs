use std::sync::Arc;

use rig::providers::cohere;
use tracing::info;

use common::{AgentConfig, AgentError, Embedder, RigEmbedder};

use crate::api::coingecko::CoinGeckoClient;
use crate::cache::CacheStore;
use crate::models::AgentReply;
use crate::orchestrator::{Orchestrator, RigOrchestrator};
use crate::tools::{
    CategorySearchTool, CheckExistingContentTool, CoinPlatformsTool, CoinsMarketDataTool,
    MarketDataByCategoryTool, ToolRegistry, UpsertContentTool,
};
use crate::workflow::ExpertWorkflow;

/// Everything a request needs, wired once at startup.
pub struct ExpertSystem {
    config: AgentConfig,
    workflow: ExpertWorkflow,
}

impl ExpertSystem {
    /// Production wiring: Cohere embeddings, OpenAI completions, a
    /// sqlite-backed cache at the configured path.
    pub async fn from_env() -> Result<Self, AgentError> {
        let config = AgentConfig::from_env()?;

        let cohere_client = cohere::Client::new(&config.cohere_api_key);
        let embedding_model =
            cohere_client.embedding_model(cohere::EMBED_ENGLISH_V3, "search_document");
        let embedder: Arc<dyn Embedder> = Arc::new(RigEmbedder::new(embedding_model));

        let orchestrator: Arc<dyn Orchestrator> = Arc::new(RigOrchestrator::new(&config));

        Self::with_components(config, orchestrator, embedder).await
    }

    /// Assembly seam: tests substitute a scripted orchestrator and a
    /// deterministic embedder here.
    pub async fn with_components(
        config: AgentConfig,
        orchestrator: Arc<dyn Orchestrator>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, AgentError> {
        let client = Arc::new(CoinGeckoClient::new(&config)?);

        let cache = Arc::new(
            CacheStore::open(&config.cache_db_path, &config.index_name, embedder).await?,
        );
        cache.ensure_index().await?;

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CheckExistingContentTool::new(cache.clone())));
        registry.register(Arc::new(CategorySearchTool::new(client.clone())));
        registry.register(Arc::new(CoinsMarketDataTool::new(client.clone())));
        registry.register(Arc::new(MarketDataByCategoryTool::new(client.clone())));
        registry.register(Arc::new(CoinPlatformsTool::new(client)));
        registry.register(Arc::new(UpsertContentTool::new(cache.clone())));

        info!(tools = registry.len(), index = %config.index_name, "expert system ready");

        let workflow = ExpertWorkflow::new(cache, registry, orchestrator);

        Ok(Self { config, workflow })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub async fn respond(&self, query: &str) -> Result<AgentReply, AgentError> {
        self.workflow.respond(query).await
    }
}
