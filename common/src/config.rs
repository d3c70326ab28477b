use std::env;

use crate::error::AgentError;

pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
const DEFAULT_INDEX_NAME: &str = "cryptocurrency-expert-agent";

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 2,
            window_secs: 60,
        }
    }
}

/// Process configuration, read from the environment exactly once at startup
/// and passed by reference to everything that needs it.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub openai_api_key: String,
    pub cohere_api_key: String,
    pub completion_model: String,
    pub coingecko_base_url: String,
    /// Name of the content cache index; the sqlite file is derived from it
    /// unless `CACHE_DB_PATH` overrides.
    pub index_name: String,
    pub cache_db_path: String,
    pub port: u16,
    /// Optional upper bound on inbound query length (`MAX_QUERY_LENGTH`).
    pub max_query_length: Option<usize>,
    pub rate_limit: RateLimitConfig,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self, AgentError> {
        dotenv::dotenv().ok();

        let openai_api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| AgentError::Config("OPENAI_API_KEY not found".to_string()))?;
        let cohere_api_key = env::var("COHERE_API_KEY")
            .map_err(|_| AgentError::Config("COHERE_API_KEY not found".to_string()))?;

        let index_name =
            env::var("CACHE_INDEX_NAME").unwrap_or_else(|_| DEFAULT_INDEX_NAME.to_string());
        let cache_db_path =
            env::var("CACHE_DB_PATH").unwrap_or_else(|_| format!("{}.db", index_name));

        Ok(Self {
            openai_api_key,
            cohere_api_key,
            completion_model: env::var("COMPLETION_MODEL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_MODEL.to_string()),
            coingecko_base_url: env::var("COINGECKO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COINGECKO_BASE_URL.to_string()),
            index_name,
            cache_db_path,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            max_query_length: env::var("MAX_QUERY_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok()),
            rate_limit: RateLimitConfig {
                max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2),
                window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60),
            },
        })
    }
}
