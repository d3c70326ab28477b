pub mod actions;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use common::AgentError;

/// Inbound message an action handles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Reply content produced by an action handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionContent {
    pub text: String,
    pub actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionContent {
    pub fn reply(action: &str, message: &ActionMessage, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: vec![action.to_string()],
            source: message.source.clone(),
            thought: None,
            data: None,
        }
    }
}

/// One conversational example line: speaker placeholder plus utterance.
#[derive(Debug, Clone, Serialize)]
pub struct ActionExample {
    pub name: &'static str,
    pub text: &'static str,
}

/// A named action with a natural-language trigger contract.
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &str;

    fn similes(&self) -> &[&str];

    fn description(&self) -> &str;

    async fn validate(&self, _message: &ActionMessage) -> Result<bool, AgentError> {
        Ok(true)
    }

    async fn handle(&self, message: &ActionMessage) -> Result<ActionContent, AgentError>;

    /// User line, then agent line.
    fn examples(&self) -> Vec<[ActionExample; 2]> {
        Vec::new()
    }
}

/// Enumerable action set with name and simile lookup.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.push(action);
    }

    /// Look an action up by its name or any of its similes, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Action>> {
        let needle = name.to_uppercase();
        self.actions
            .iter()
            .find(|action| action.name() == needle || action.similes().contains(&needle.as_str()))
    }

    pub fn all(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{HelloWorldAction, TestAction};

    fn registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(HelloWorldAction));
        registry.register(Arc::new(TestAction));
        registry
    }

    #[test]
    fn lookup_by_name_is_case_insensitive() {
        let registry = registry();
        assert!(registry.get("hello_world").is_some());
        assert!(registry.get("HELLO_WORLD").is_some());
        assert!(registry.get("NOPE").is_none());
    }

    #[test]
    fn lookup_falls_back_to_similes() {
        let registry = registry();
        assert_eq!(registry.get("GREET").unwrap().name(), "HELLO_WORLD");
        assert_eq!(registry.get("basic_test").unwrap().name(), "TEST_ACTION");
    }
}
