use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use common::AgentError;

use super::Tool;
use crate::api::coingecko::CoinGeckoClient;

#[derive(Debug, Default, Deserialize)]
struct CategorySearchArgs {
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    include_market_data: bool,
}

/// Lists cryptocurrency categories, optionally narrowed by keywords.
pub struct CategorySearchTool {
    client: Arc<CoinGeckoClient>,
}

impl CategorySearchTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CategorySearchTool {
    fn name(&self) -> &str {
        "category_search"
    }

    fn description(&self) -> &str {
        "Get the list of cryptocurrency categories. Pass keywords to narrow the list; \
         set include_market_data to get per-category market metadata instead of the plain list"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "keywords": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Keywords matched case-insensitively against category names and ids"
                },
                "include_market_data": {
                    "type": "boolean",
                    "default": false,
                    "description": "Return per-category market metadata (ignores keywords)"
                }
            }
        })
    }

    async fn call(&self, args: Value) -> Result<Value, AgentError> {
        let args: CategorySearchArgs = serde_json::from_value(args)
            .map_err(|e| AgentError::Validation(format!("invalid category_search arguments: {e}")))?;

        if args.include_market_data {
            let categories = self.client.categories_markets().await?;
            return Ok(json!(categories));
        }

        let records = self.client.categories(args.keywords.as_deref()).await?;
        Ok(json!(records))
    }
}
