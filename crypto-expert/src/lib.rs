pub mod api;
pub mod cache;
pub mod middleware;
pub mod models;
pub mod orchestrator;
pub mod routes;
pub mod system;
pub mod tools;
pub mod workflow;

// Re-export main components
pub use api::coingecko::CoinGeckoClient;
pub use models::{
    AgentReply, CategoryRecord, MarketQuery, Platform, PlatformCoin, SearchHit, SearchOutcome,
    UpsertReceipt,
};
pub use system::ExpertSystem;
pub use workflow::ExpertWorkflow;
