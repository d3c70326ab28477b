use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use common::AgentError;

use super::Tool;
use crate::cache::{CacheStore, DEFAULT_SEARCH_LIMIT, DEFAULT_SOURCE};

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

#[derive(Debug, Deserialize)]
struct CheckExistingContentArgs {
    topic: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

/// Cache lookup. The workflow runs this before any remote fetch.
pub struct CheckExistingContentTool {
    store: Arc<CacheStore>,
}

impl CheckExistingContentTool {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CheckExistingContentTool {
    fn name(&self) -> &str {
        "check_existing_content"
    }

    fn description(&self) -> &str {
        "Check if there is existing content in the database related to a specific topic \
         with high similarity score. ALWAYS run this tool first out of all the other \
         tools to check for existing content"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "The topic to search for in the database"
                },
                "limit": {
                    "type": "number",
                    "default": 2,
                    "description": "Maximum number of results to return"
                }
            },
            "required": ["topic"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, AgentError> {
        let args: CheckExistingContentArgs = serde_json::from_value(args).map_err(|e| {
            AgentError::Validation(format!("invalid check_existing_content arguments: {e}"))
        })?;

        let outcome = self.store.search(&args.topic, args.limit).await?;
        Ok(json!(outcome))
    }
}

#[derive(Debug, Deserialize)]
struct UpsertContentArgs {
    content: String,
    topic: String,
    #[serde(default = "default_source")]
    source: String,
    #[serde(default)]
    metadata: Map<String, Value>,
}

/// Cache write. The workflow runs this after a fresh answer is produced.
pub struct UpsertContentTool {
    store: Arc<CacheStore>,
}

impl UpsertContentTool {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for UpsertContentTool {
    fn name(&self) -> &str {
        "upsert_content"
    }

    fn description(&self) -> &str {
        "Upsert content to the database with metadata for future retrieval. Before \
         passing in content, make sure you format it in a way that is easy to parse \
         and understand"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The content to store in the database"
                },
                "topic": {
                    "type": "string",
                    "description": "The main topic of the content"
                },
                "source": {
                    "type": "string",
                    "default": "agent_response",
                    "description": "Source of the content"
                },
                "metadata": {
                    "type": "object",
                    "default": {},
                    "description": "Additional metadata to store"
                }
            },
            "required": ["content", "topic"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, AgentError> {
        let args: UpsertContentArgs = serde_json::from_value(args)
            .map_err(|e| AgentError::Validation(format!("invalid upsert_content arguments: {e}")))?;

        let receipt = self
            .store
            .upsert(&args.content, &args.topic, &args.source, args.metadata)
            .await?;
        Ok(json!(receipt))
    }
}
