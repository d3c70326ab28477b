use thiserror::Error;

/// One error discipline for every tool and action boundary: typed results,
/// no error-shaped success payloads.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
