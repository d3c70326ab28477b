use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use common::AgentError;

use super::Tool;
use crate::api::coingecko::CoinGeckoClient;
use crate::models::{default_vs_currency, MarketQuery};

/// Market data for arbitrary coin selections, mirroring the upstream
/// `/coins/markets` filters.
pub struct CoinsMarketDataTool {
    client: Arc<CoinGeckoClient>,
}

impl CoinsMarketDataTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CoinsMarketDataTool {
    fn name(&self) -> &str {
        "coins_market_data"
    }

    fn description(&self) -> &str {
        "Get the market data for all cryptocurrencies. If only interested in a specific \
         category pass it as a parameter, and if only interested on certain coins pass \
         their ids or names as a parameter"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "vs_currency": {
                    "type": "string",
                    "default": "usd",
                    "description": "The currency to use for the market data, 3 letter code"
                },
                "ids": {
                    "type": "string",
                    "description": "Comma separated list of coin ids"
                },
                "names": {
                    "type": "string",
                    "description": "Comma separated list of coin names"
                },
                "category": {
                    "type": "string",
                    "description": "The category of the coins we are searching for"
                }
            }
        })
    }

    async fn call(&self, args: Value) -> Result<Value, AgentError> {
        let query: MarketQuery = serde_json::from_value(args)
            .map_err(|e| AgentError::Validation(format!("invalid coins_market_data arguments: {e}")))?;

        let coins = self.client.markets(&query).await?;
        Ok(json!(coins))
    }
}

#[derive(Debug, Deserialize)]
struct MarketDataByCategoryArgs {
    #[serde(default = "default_vs_currency")]
    vs_currency: String,
    category: String,
}

/// Top 30 coins of one category by market cap, descending.
pub struct MarketDataByCategoryTool {
    client: Arc<CoinGeckoClient>,
}

impl MarketDataByCategoryTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for MarketDataByCategoryTool {
    fn name(&self) -> &str {
        "market_data_by_category"
    }

    fn description(&self) -> &str {
        "Get the market data for the top cryptocurrencies in a specific category, ordered \
         by market cap. ALWAYS run check_existing_content first to check for existing \
         content before using this tool. DO NOT use this tool if there is relevant \
         existing content found"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "vs_currency": {
                    "type": "string",
                    "default": "usd",
                    "description": "The currency to use for the market data, 3 letter code"
                },
                "category": {
                    "type": "string",
                    "description": "The category of the coins we are searching for"
                }
            },
            "required": ["category"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, AgentError> {
        let args: MarketDataByCategoryArgs = serde_json::from_value(args).map_err(|e| {
            AgentError::Validation(format!("invalid market_data_by_category arguments: {e}"))
        })?;

        let coins = self
            .client
            .markets_by_category(&args.vs_currency, &args.category)
            .await?;
        Ok(json!(coins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_args_default_currency_to_usd() {
        let args: MarketDataByCategoryArgs =
            serde_json::from_value(json!({"category": "defi"})).unwrap();
        assert_eq!(args.vs_currency, "usd");
        assert_eq!(args.category, "defi");
    }

    #[test]
    fn category_is_required() {
        let parsed: Result<MarketDataByCategoryArgs, _> = serde_json::from_value(json!({}));
        assert!(parsed.is_err());
    }
}
