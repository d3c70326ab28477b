use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use common::AgentError;

/// One entry of the remote category list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRecord {
    pub category_id: String,
    pub name: String,
}

pub(crate) fn default_vs_currency() -> String {
    "usd".to_string()
}

/// Filters for the `/coins/markets` endpoint. All narrowing filters are
/// optional; upstream combines them with logical AND.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuery {
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self {
            vs_currency: default_vs_currency(),
            ids: None,
            names: None,
            category: None,
        }
    }
}

/// Platforms the coin filter accepts. Anything else is rejected before a
/// request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Ethereum,
    Avalanche,
    Base,
    ArbitrumOne,
    PolygonPos,
    Solana,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Platform::Ethereum,
        Platform::Avalanche,
        Platform::Base,
        Platform::ArbitrumOne,
        Platform::PolygonPos,
        Platform::Solana,
    ];

    /// The platform key as it appears in the remote `platforms` mapping.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ethereum => "ethereum",
            Platform::Avalanche => "avalanche",
            Platform::Base => "base",
            Platform::ArbitrumOne => "arbitrum-one",
            Platform::PolygonPos => "polygon-pos",
            Platform::Solana => "solana",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                AgentError::Validation(format!(
                    "unsupported platform '{}', expected one of: ethereum, avalanche, base, arbitrum-one, polygon-pos, solana",
                    s
                ))
            })
    }
}

/// Coin entry from `/coins/list?include_platform=true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub platforms: HashMap<String, Option<String>>,
}

impl PlatformCoin {
    /// A platform entry counts only when present with a non-empty contract
    /// address; null and empty-string entries do not.
    pub fn on_platform(&self, platform: Platform) -> bool {
        matches!(
            self.platforms.get(platform.as_str()),
            Some(Some(address)) if !address.is_empty()
        )
    }
}

/// Ranked hit from the content cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    pub metadata: Value,
}

/// Result of a cache lookup. `threshold` is advisory metadata: the store
/// returns all `limit` nearest hits and leaves accept/reject to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub found: bool,
    pub count: usize,
    pub results: Vec<SearchHit>,
    pub topic: String,
    pub threshold: f64,
}

/// Receipt for a stored cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertReceipt {
    pub success: bool,
    pub id: String,
    pub topic: String,
    pub content_length: usize,
    pub timestamp: String,
}

/// Final reply from the retrieval-augmented workflow.
#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub response: String,
    pub topic: String,
    pub from_cache: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn platform_parses_kebab_case_names() {
        assert_eq!("arbitrum-one".parse::<Platform>().unwrap(), Platform::ArbitrumOne);
        assert_eq!("polygon-pos".parse::<Platform>().unwrap(), Platform::PolygonPos);
        assert_eq!("ethereum".parse::<Platform>().unwrap(), Platform::Ethereum);
    }

    #[test]
    fn platform_rejects_unknown_names() {
        let err = "dogechain".parse::<Platform>().unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
        assert!(err.to_string().contains("dogechain"));
    }

    #[test]
    fn market_query_defaults_to_usd() {
        let query: MarketQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.vs_currency, "usd");
        assert!(query.ids.is_none());
        assert!(query.names.is_none());
        assert!(query.category.is_none());
    }

    #[test]
    fn on_platform_requires_truthy_entry() {
        let coin: PlatformCoin = serde_json::from_value(json!({
            "id": "usd-coin",
            "symbol": "usdc",
            "name": "USDC",
            "platforms": {
                "ethereum": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
                "base": "",
                "solana": null
            }
        }))
        .unwrap();

        assert!(coin.on_platform(Platform::Ethereum));
        assert!(!coin.on_platform(Platform::Base));
        assert!(!coin.on_platform(Platform::Solana));
        assert!(!coin.on_platform(Platform::Avalanche));
    }

    #[test]
    fn platform_coin_tolerates_missing_platforms_key() {
        let coin: PlatformCoin = serde_json::from_value(json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin"
        }))
        .unwrap();
        assert!(!coin.on_platform(Platform::Ethereum));
    }
}
