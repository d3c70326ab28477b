use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use common::{AgentConfig, AgentError};

use crate::models::{CategoryRecord, MarketQuery, Platform, PlatformCoin};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of records the category market-data variant returns: top of the
/// category by market cap, descending, first page only.
const CATEGORY_PAGE_SIZE: u32 = 30;

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &AgentConfig) -> Result<Self, AgentError> {
        Self::with_base_url(config.coingecko_base_url.clone())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36")
            .build()
            .map_err(|e| AgentError::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Single GET against the API. Any transport failure, non-2xx status or
    /// non-JSON body is fatal for the call; there is no retry.
    async fn make_request(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Value, AgentError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AgentError::Upstream(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::Upstream(format!(
                "CoinGecko API error: {} - {}",
                status, error_text
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AgentError::Upstream(format!("failed to read response body: {e}")))?;

        if text.trim().is_empty() {
            return Err(AgentError::Upstream(
                "Empty response from CoinGecko".to_string(),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| AgentError::Upstream(format!("failed to parse JSON response: {e}")))
    }

    /// Full category list, optionally narrowed by keywords. A record is kept
    /// when any keyword matches either its name or its id.
    pub async fn categories(
        &self,
        keywords: Option<&[String]>,
    ) -> Result<Vec<CategoryRecord>, AgentError> {
        println!("🔍 Fetching cryptocurrency categories...");

        let data = self
            .make_request("/coins/categories/list", &[])
            .await
            .map_err(|e| {
                println!("❌ Failed to fetch categories");
                e
            })?;

        let records: Vec<CategoryRecord> = serde_json::from_value(data)
            .map_err(|e| AgentError::Upstream(format!("unexpected category list shape: {e}")))?;

        println!("✅ Categories fetched successfully ({})", records.len());

        Ok(match keywords {
            Some(keywords) => filter_categories(records, keywords),
            None => records,
        })
    }

    /// The metadata-rich category listing (market cap, volume, top coins per
    /// category), passed through opaque.
    pub async fn categories_markets(&self) -> Result<Vec<Value>, AgentError> {
        println!("🔍 Fetching category market data...");

        let data = self.make_request("/coins/categories", &[]).await.map_err(|e| {
            println!("❌ Failed to fetch category market data");
            e
        })?;

        let categories: Vec<Value> = serde_json::from_value(data).map_err(|e| {
            AgentError::Upstream(format!("unexpected category market shape: {e}"))
        })?;

        println!("✅ Category market data fetched successfully");
        Ok(categories)
    }

    /// Market data for coins matching the query filters. Records are opaque
    /// JSON; upstream attribute drift is not this client's concern.
    pub async fn markets(&self, query: &MarketQuery) -> Result<Vec<Value>, AgentError> {
        println!("📊 Fetching market data...");

        let params = market_query_params(query);
        let data = self.make_request("/coins/markets", &params).await.map_err(|e| {
            println!("❌ Failed to fetch market data");
            e
        })?;

        let coins: Vec<Value> = serde_json::from_value(data)
            .map_err(|e| AgentError::Upstream(format!("unexpected market data shape: {e}")))?;

        println!("✅ Market data fetched successfully ({})", coins.len());
        Ok(coins)
    }

    /// Top of a category by market cap, descending, capped at 30 records.
    /// Ties pass through in upstream order so identical calls against
    /// unchanged upstream state return identical output.
    pub async fn markets_by_category(
        &self,
        vs_currency: &str,
        category: &str,
    ) -> Result<Vec<Value>, AgentError> {
        println!("📊 Fetching market data for category '{}'...", category);

        let params = vec![
            ("vs_currency".to_string(), vs_currency.to_string()),
            ("category".to_string(), category.to_string()),
            ("order".to_string(), "market_cap_desc".to_string()),
            ("per_page".to_string(), CATEGORY_PAGE_SIZE.to_string()),
            ("page".to_string(), "1".to_string()),
        ];

        let data = self.make_request("/coins/markets", &params).await.map_err(|e| {
            println!("❌ Failed to fetch market data");
            e
        })?;

        let coins: Vec<Value> = serde_json::from_value(data)
            .map_err(|e| AgentError::Upstream(format!("unexpected market data shape: {e}")))?;

        println!("✅ Market data fetched successfully ({})", coins.len());
        Ok(coins)
    }

    /// All coins with a live contract on the given platform. The platform
    /// value is validated by the `Platform` enum before this is called, so
    /// no request is ever made for an unsupported platform.
    pub async fn coins_on_platform(
        &self,
        platform: Platform,
    ) -> Result<Vec<PlatformCoin>, AgentError> {
        println!("📊 Fetching coins on {}...", platform);

        let params = vec![("include_platform".to_string(), "true".to_string())];
        let data = self.make_request("/coins/list", &params).await.map_err(|e| {
            println!("❌ Failed to fetch coin platforms");
            e
        })?;

        let coins: Vec<PlatformCoin> = serde_json::from_value(data)
            .map_err(|e| AgentError::Upstream(format!("unexpected coin list shape: {e}")))?;

        let filtered: Vec<PlatformCoin> = coins
            .into_iter()
            .filter(|coin| coin.on_platform(platform))
            .collect();

        println!("✅ Found {} coins on {}", filtered.len(), platform);
        Ok(filtered)
    }
}

/// Keyword filter over the category list: keep a record iff any keyword,
/// case-insensitively, is a substring of the name or the id.
pub fn filter_categories(
    records: Vec<CategoryRecord>,
    keywords: &[String],
) -> Vec<CategoryRecord> {
    if keywords.is_empty() {
        return records;
    }
    let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    records
        .into_iter()
        .filter(|record| {
            let name = record.name.to_lowercase();
            let id = record.category_id.to_lowercase();
            needles.iter().any(|k| name.contains(k) || id.contains(k))
        })
        .collect()
}

pub(crate) fn market_query_params(query: &MarketQuery) -> Vec<(String, String)> {
    let mut params = vec![("vs_currency".to_string(), query.vs_currency.clone())];
    if let Some(ids) = &query.ids {
        params.push(("ids".to_string(), ids.clone()));
    }
    if let Some(names) = &query.names {
        params.push(("names".to_string(), names.clone()));
    }
    if let Some(category) = &query.category {
        params.push(("category".to_string(), category.clone()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> CategoryRecord {
        CategoryRecord {
            category_id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn sample_categories() -> Vec<CategoryRecord> {
        vec![
            record("decentralized-finance-defi", "DeFi"),
            record("non-fungible-tokens-nft", "NFTs & Collectibles"),
            record("layer-1", "Layer 1 (L1)"),
            record("meme-token", "Meme"),
        ]
    }

    #[test]
    fn no_keywords_returns_everything() {
        let all = sample_categories();
        assert_eq!(filter_categories(all.clone(), &[]), all);
    }

    #[test]
    fn keyword_matches_name_case_insensitively() {
        let filtered = filter_categories(sample_categories(), &["DEFI".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "DeFi");
    }

    #[test]
    fn keyword_matches_category_id() {
        let filtered = filter_categories(sample_categories(), &["fungible".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category_id, "non-fungible-tokens-nft");
    }

    #[test]
    fn any_keyword_is_enough() {
        let keywords = vec!["meme".to_string(), "layer".to_string()];
        let filtered = filter_categories(sample_categories(), &keywords);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn unmatched_keywords_filter_everything_out() {
        let filtered = filter_categories(sample_categories(), &["gamefi".to_string()]);
        assert!(filtered.is_empty());
    }

    #[test]
    fn market_params_include_only_set_filters() {
        let query = MarketQuery::default();
        assert_eq!(
            market_query_params(&query),
            vec![("vs_currency".to_string(), "usd".to_string())]
        );

        let query = MarketQuery {
            vs_currency: "eur".to_string(),
            ids: Some("bitcoin,ethereum".to_string()),
            names: None,
            category: Some("layer-1".to_string()),
        };
        let params = market_query_params(&query);
        assert_eq!(params.len(), 3);
        assert!(params.contains(&("ids".to_string(), "bitcoin,ethereum".to_string())));
        assert!(params.contains(&("category".to_string(), "layer-1".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "names"));
    }
}
