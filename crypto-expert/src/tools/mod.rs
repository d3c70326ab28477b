use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use common::AgentError;

mod category_search;
mod coin_platforms;
mod content_cache;
mod market_data;

pub use category_search::CategorySearchTool;
pub use coin_platforms::CoinPlatformsTool;
pub use content_cache::{CheckExistingContentTool, UpsertContentTool};
pub use market_data::{CoinsMarketDataTool, MarketDataByCategoryTool};

/// A callable unit the orchestrator may invoke: declared name, description
/// and parameter schema, plus the call itself.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameter object.
    fn parameters(&self) -> Value;

    async fn call(&self, args: Value) -> Result<Value, AgentError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Declarative view of a tool, rendered into the orchestrator's prompt.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The enumerable set of tools handed to the orchestrator.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, AgentError> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::Validation(format!("unknown tool '{name}'")))?;
        tool.call(args).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
