use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use common::AgentError;
use crypto_expert::{CategoryRecord, CoinGeckoClient};

use crate::{Action, ActionContent, ActionExample, ActionMessage};

/// Simplest possible action; also exercised by the debug routes.
pub struct HelloWorldAction;

#[async_trait]
impl Action for HelloWorldAction {
    fn name(&self) -> &str {
        "HELLO_WORLD"
    }

    fn similes(&self) -> &[&str] {
        &["GREET", "SAY_HELLO"]
    }

    fn description(&self) -> &str {
        "Responds with a simple hello world message"
    }

    async fn handle(&self, message: &ActionMessage) -> Result<ActionContent, AgentError> {
        info!("Handling HELLO_WORLD action");
        Ok(ActionContent::reply("HELLO_WORLD", message, "hello world!"))
    }

    fn examples(&self) -> Vec<[ActionExample; 2]> {
        vec![[
            ActionExample {
                name: "{{name1}}",
                text: "Can you say hello?",
            },
            ActionExample {
                name: "{{name2}}",
                text: "hello world!",
            },
        ]]
    }
}

pub struct TestAction;

#[async_trait]
impl Action for TestAction {
    fn name(&self) -> &str {
        "TEST_ACTION"
    }

    fn similes(&self) -> &[&str] {
        &["TEST", "SIMPLE_TEST", "BASIC_TEST"]
    }

    fn description(&self) -> &str {
        "A simple test action that returns a basic response"
    }

    async fn handle(&self, message: &ActionMessage) -> Result<ActionContent, AgentError> {
        info!("Handling TEST_ACTION");
        Ok(ActionContent::reply(
            "TEST_ACTION",
            message,
            "This is a test response from the TEST_ACTION. If you see this, the action system is working!",
        ))
    }

    fn examples(&self) -> Vec<[ActionExample; 2]> {
        vec![[
            ActionExample {
                name: "{{name1}}",
                text: "Test the action system",
            },
            ActionExample {
                name: "{{name2}}",
                text: "This is a test response from the TEST_ACTION. If you see this, the action system is working!",
            },
        ]]
    }
}

/// First 10 categories plus a total count, the shape chat clients expect.
pub fn format_category_summary(categories: &[CategoryRecord]) -> String {
    let category_list = categories
        .iter()
        .take(10)
        .map(|cat| format!("- {} (ID: {})", cat.name, cat.category_id))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "I've fetched the complete list of cryptocurrency categories from CoinGecko. \
         Here are the first 10 categories:\n{}\n\nThere are {} total categories \
         available. The full data has been loaded and is ready for you to explore.",
        category_list,
        categories.len()
    )
}

pub struct GetCoinCategoriesAction {
    client: Arc<CoinGeckoClient>,
}

impl GetCoinCategoriesAction {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Action for GetCoinCategoriesAction {
    fn name(&self) -> &str {
        "GET_COIN_CATEGORIES"
    }

    fn similes(&self) -> &[&str] {
        &[
            "LIST_CATEGORIES",
            "SHOW_CATEGORIES",
            "GET_ALL_CATEGORIES",
            "VIEW_CATEGORIES",
            "COIN_CATEGORIES",
            "CRYPTO_CATEGORIES",
            "CATEGORIES_LIST",
            "SHOW_ALL_CATEGORIES",
            "GET_CATEGORIES",
            "LIST_ALL_CATEGORIES",
        ]
    }

    fn description(&self) -> &str {
        "Get the full list of coin categories from coingecko"
    }

    async fn handle(&self, message: &ActionMessage) -> Result<ActionContent, AgentError> {
        info!("Handling GET_COIN_CATEGORIES action");

        let categories = self.client.categories(None).await?;

        let mut content = ActionContent::reply(
            "GET_COIN_CATEGORIES",
            message,
            format_category_summary(&categories),
        );
        content.thought =
            Some("I am fetching the list of categories from CoinGecko.".to_string());
        Ok(content)
    }

    fn examples(&self) -> Vec<[ActionExample; 2]> {
        vec![
            [
                ActionExample {
                    name: "{{name1}}",
                    text: "What cryptocurrency categories are available?",
                },
                ActionExample {
                    name: "{{name2}}",
                    text: "Here are all available cryptocurrency categories:\n- DeFi (ID: defi)\n- NFT (ID: nft)\n...",
                },
            ],
            [
                ActionExample {
                    name: "{{name1}}",
                    text: "Show me all coin categories",
                },
                ActionExample {
                    name: "{{name2}}",
                    text: "Here are all available cryptocurrency categories:\n- DeFi (ID: defi)\n- NFT (ID: nft)\n...",
                },
            ],
        ]
    }
}

/// First category whose name or id contains the query, case-insensitively.
pub fn find_matching_category<'a>(
    categories: &'a [CategoryRecord],
    query: &str,
) -> Option<&'a CategoryRecord> {
    let needle = query.to_lowercase();
    categories.iter().find(|category| {
        category.name.to_lowercase().contains(&needle)
            || category.category_id.to_lowercase().contains(&needle)
    })
}

pub struct GetSpecificCategoryAction {
    client: Arc<CoinGeckoClient>,
}

impl GetSpecificCategoryAction {
    pub fn new(client: Arc<CoinGeckoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Action for GetSpecificCategoryAction {
    fn name(&self) -> &str {
        "GET_SPECIFIC_CATEGORY"
    }

    fn similes(&self) -> &[&str] {
        &[
            "FIND_CATEGORY",
            "SEARCH_CATEGORY",
            "LOOKUP_CATEGORY",
            "GET_CATEGORY_INFO",
            "SPECIFIC_CATEGORY",
            "CATEGORY_INFO",
            "FIND_SPECIFIC_CATEGORY",
            "SEARCH_SPECIFIC_CATEGORY",
            "LOOKUP_SPECIFIC_CATEGORY",
            "GET_CATEGORY_DETAILS",
        ]
    }

    fn description(&self) -> &str {
        "Get information about a specific coin category"
    }

    async fn handle(&self, message: &ActionMessage) -> Result<ActionContent, AgentError> {
        info!("Handling GET_SPECIFIC_CATEGORY action");

        let query = message.text.trim().to_lowercase();
        let categories = self.client.categories(None).await?;

        let content = match find_matching_category(&categories, &query) {
            Some(category) => {
                info!(category = %category.name, "found matching category");
                let mut content = ActionContent::reply(
                    "GET_SPECIFIC_CATEGORY",
                    message,
                    format!(
                        "I found the category you're looking for:\nName: {}\nID: {}",
                        category.name, category.category_id
                    ),
                );
                content.data = Some(json!(category));
                content
            }
            None => {
                info!(query = %query, "no matching category found");
                ActionContent::reply(
                    "GET_SPECIFIC_CATEGORY",
                    message,
                    format!(
                        "I couldn't find any category matching \"{}\". Would you like to see the full list of available categories?",
                        query
                    ),
                )
            }
        };
        Ok(content)
    }

    fn examples(&self) -> Vec<[ActionExample; 2]> {
        vec![
            [
                ActionExample {
                    name: "{{name1}}",
                    text: "Tell me about the DeFi category",
                },
                ActionExample {
                    name: "{{name2}}",
                    text: "I found the category you're looking for:\nName: DeFi\nID: defi",
                },
            ],
            [
                ActionExample {
                    name: "{{name1}}",
                    text: "What is the NFT category?",
                },
                ActionExample {
                    name: "{{name2}}",
                    text: "I found the category you're looking for:\nName: NFT\nID: nft",
                },
            ],
        ]
    }
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

    #[test]
    fn summary_lists_at_most_ten_and_counts_all() {
        let categories: Vec<CategoryRecord> = (0..12)
            .map(|i| record(&format!("cat-{i}"), &format!("Category {i}")))
            .collect();

        let summary = format_category_summary(&categories);
        assert!(summary.contains("- Category 0 (ID: cat-0)"));
        assert!(summary.contains("- Category 9 (ID: cat-9)"));
        assert!(!summary.contains("Category 10"));
        assert!(summary.contains("There are 12 total categories"));
    }

    #[test]
    fn matching_checks_name_and_id_case_insensitively() {
        let categories = vec![
            record("decentralized-finance-defi", "DeFi"),
            record("non-fungible-tokens-nft", "NFTs & Collectibles"),
        ];

        assert_eq!(
            find_matching_category(&categories, "defi").unwrap().name,
            "DeFi"
        );
        assert_eq!(
            find_matching_category(&categories, "FUNGIBLE").unwrap().name,
            "NFTs & Collectibles"
        );
        assert!(find_matching_category(&categories, "gamefi").is_none());
    }

    #[tokio::test]
    async fn hello_world_replies_with_the_fixed_text() {
        let message = ActionMessage {
            text: "Can you say hello?".to_string(),
            source: Some("test".to_string()),
        };

        let content = HelloWorldAction.handle(&message).await.unwrap();
        assert_eq!(content.text, "hello world!");
        assert_eq!(content.actions, vec!["HELLO_WORLD".to_string()]);
        assert_eq!(content.source.as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn test_action_confirms_the_action_system() {
        let content = TestAction.handle(&ActionMessage::default()).await.unwrap();
        assert!(content.text.contains("the action system is working"));
        assert_eq!(content.actions, vec!["TEST_ACTION".to_string()]);
    }
}
