use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use common::AgentError;

use super::Tool;
use crate::api::coingecko::CoinGeckoClient;
use crate::models::Platform;

#[derive(Debug, Deserialize)]
struct CoinPlatformsArgs {
    platform: String,
}

/// Lists the coins deployed on one supported platform.
pub struct CoinPlatformsTool {
    client: Arc<CoinGeckoClient>,
}

impl CoinPlatformsTool {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CoinPlatformsTool {
    fn name(&self) -> &str {
        "coin_platforms"
    }

    fn description(&self) -> &str {
        "Get the list of coins for a given platform. Make sure to always provide a \
         platform relevant to what the user is asking for"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "platform": {
                    "type": "string",
                    "enum": ["ethereum", "avalanche", "base", "arbitrum-one", "polygon-pos", "solana"],
                    "description": "The platform to get the coins for. Must be one of the supported platforms: ethereum, avalanche, base, arbitrum-one, polygon-pos, or solana"
                }
            },
            "required": ["platform"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, AgentError> {
        let args: CoinPlatformsArgs = serde_json::from_value(args)
            .map_err(|e| AgentError::Validation(format!("invalid coin_platforms arguments: {e}")))?;

        // Enum validation happens here, before any request goes out.
        let platform: Platform = args.platform.parse()?;

        let coins = self.client.coins_on_platform(platform).await?;
        Ok(json!(coins))
    }
}
