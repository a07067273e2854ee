use thiserror::Error;

use crate::tools::ToolError;

/// Failures talking to the model backend
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM error: {0}")]
    Status(u16),

    #[error("LLM transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid LLM reply: {0}")]
    InvalidReply(#[from] serde_json::Error),
}

impl ProviderError {
    /// The HTTP status returned by the backend, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status(code) => Some(*code),
            ProviderError::Transport(err) => err.status().map(|s| s.as_u16()),
            ProviderError::InvalidReply(_) => None,
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("no message")]
    MissingInput,

    #[error(transparent)]
    Backend(#[from] ProviderError),

    #[error("unknown_tool")]
    UnknownTool(String),

    #[error("Tool {name} failed: {source}")]
    ToolExecution {
        name: String,
        #[source]
        source: ToolError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
