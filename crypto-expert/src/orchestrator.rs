use async_trait::async_trait;
use rig::completion::Prompt;
use rig::providers::openai;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use common::{AgentConfig, AgentError};

use crate::models::SearchHit;
use crate::tools::ToolRegistry;

const MAX_RESEARCH_STEPS: usize = 6;
const MAX_OBSERVATION_CHARS: usize = 6000;

const EXPERT_PREAMBLE: &str =
    "You are a cryptocurrency expert agent that is responsible for providing information \
     about cryptocurrencies. You should use the tools provided to you to get the \
     information you need.";

/// The reasoning side of the system, injected behind a narrow interface so
/// the workflow can be exercised with a scripted implementation.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Distill a free-text query into the short topic string used both as
    /// the cache search query and the storage namespace.
    async fn infer_topic(&self, query: &str) -> Result<String, AgentError>;

    /// Answer the query from fresh data; free to invoke any registered tool.
    async fn research(&self, query: &str, registry: &ToolRegistry)
        -> Result<String, AgentError>;

    /// Compose an answer from previously cached hits without fetching.
    async fn summarize_cached(
        &self,
        query: &str,
        hits: &[SearchHit],
    ) -> Result<String, AgentError>;
}

/// A single reasoning step parsed from the model's reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Invoke { tool: String, args: Value },
    Final { answer: String },
}

#[derive(Deserialize)]
struct RawDecision {
    tool: Option<String>,
    #[serde(default)]
    args: Option<Value>,
    answer: Option<String>,
}

/// Extract the decision object from a model reply. Models wrap JSON in prose
/// or code fences often enough that we scan for the outermost braces.
pub fn parse_decision(raw: &str) -> Result<Decision, AgentError> {
    let start = raw
        .find('{')
        .ok_or_else(|| AgentError::Model(format!("no decision object in model reply: {raw}")))?;
    let end = raw
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| AgentError::Model(format!("no decision object in model reply: {raw}")))?;

    let parsed: RawDecision = serde_json::from_str(&raw[start..=end])
        .map_err(|e| AgentError::Model(format!("malformed decision object: {e}")))?;

    match parsed {
        RawDecision {
            tool: Some(tool),
            args,
            ..
        } => Ok(Decision::Invoke {
            tool,
            args: args.unwrap_or_else(|| Value::Object(Default::default())),
        }),
        RawDecision {
            answer: Some(answer),
            ..
        } => Ok(Decision::Final { answer }),
        _ => Err(AgentError::Model(format!(
            "decision object names neither a tool nor an answer: {raw}"
        ))),
    }
}

fn clip(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(limit).collect();
    clipped.push_str("…(truncated)");
    clipped
}

/// LLM-backed orchestrator over a rig openai agent. Tool definitions are
/// rendered into each prompt and the model answers with one JSON decision
/// per step, bounded by a step budget.
pub struct RigOrchestrator {
    agent: rig::agent::Agent<openai::CompletionModel>,
}

impl RigOrchestrator {
    pub fn new(config: &AgentConfig) -> Self {
        let client = openai::Client::new(&config.openai_api_key);
        let agent = client
            .agent(&config.completion_model)
            .preamble(EXPERT_PREAMBLE)
            .temperature(0.2)
            .build();

        Self { agent }
    }
}

#[async_trait]
impl Orchestrator for RigOrchestrator {
    async fn infer_topic(&self, query: &str) -> Result<String, AgentError> {
        let prompt = format!(
            "Reduce this cryptocurrency question to a short topic phrase (2-6 words) \
             usable as a cache key. Reply with the phrase only, no quotes or punctuation.\n\n\
             Question: {query}"
        );

        let reply = self
            .agent
            .prompt(prompt.as_str())
            .await
            .map_err(|e| AgentError::Model(format!("completion request failed: {e}")))?;

        let topic = reply.trim().trim_matches('"').trim().to_lowercase();
        if topic.is_empty() {
            return Ok(query.trim().to_lowercase());
        }
        Ok(topic)
    }

    async fn research(
        &self,
        query: &str,
        registry: &ToolRegistry,
    ) -> Result<String, AgentError> {
        let definitions = serde_json::to_string_pretty(&registry.definitions())
            .map_err(|e| AgentError::Model(e.to_string()))?;
        let mut transcript = String::new();

        for step in 0..MAX_RESEARCH_STEPS {
            let prompt = format!(
                "Available tools:\n{definitions}\n\n\
                 User query: {query}\n\n\
                 Tool calls so far:\n{transcript}\n\
                 Reply with exactly one JSON object: either\n\
                 {{\"tool\": \"<name>\", \"args\": {{...}}}} to call a tool, or\n\
                 {{\"answer\": \"<final answer for the user>\"}} when you have enough information."
            );

            let reply = self
                .agent
                .prompt(prompt.as_str())
                .await
                .map_err(|e| AgentError::Model(format!("completion request failed: {e}")))?;
            debug!(step, reply = %reply, "model decision");

            match parse_decision(&reply)? {
                Decision::Invoke { tool, args } => {
                    info!(step, tool = %tool, "invoking tool");
                    let observation = registry.invoke(&tool, args).await?;
                    let rendered = serde_json::to_string(&observation)
                        .map_err(|e| AgentError::Model(e.to_string()))?;
                    transcript.push_str(&format!(
                        "- {tool} returned: {}\n",
                        clip(&rendered, MAX_OBSERVATION_CHARS)
                    ));
                }
                Decision::Final { answer } => return Ok(answer),
            }
        }

        Err(AgentError::Model(format!(
            "no final answer after {MAX_RESEARCH_STEPS} research steps"
        )))
    }

    async fn summarize_cached(
        &self,
        query: &str,
        hits: &[SearchHit],
    ) -> Result<String, AgentError> {
        let mut context = String::new();
        for hit in hits {
            if let Some(text) = hit.metadata.get("chunk_text").and_then(|v| v.as_str()) {
                context.push_str(text);
                context.push('\n');
            }
        }

        let prompt = format!(
            "Answer the question using only this previously stored research:\n\
             {context}\n\
             Question: {query}"
        );

        self.agent
            .prompt(prompt.as_str())
            .await
            .map_err(|e| AgentError::Model(format!("completion request failed: {e}")))
    }
}
