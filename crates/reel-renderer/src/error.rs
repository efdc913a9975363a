//! Renderer client error types.

use thiserror::Error;

pub type RendererResult<T> = Result<T, RendererError>;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Renderer returned status {status}")]
    Status { status: u16 },

    #[error("Renderer request timed out")]
    Timeout,

    #[error("Renderer unreachable: {0}")]
    Transport(String),

    #[error("Failed to encode render spec: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RendererError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RendererError::Timeout
        } else {
            RendererError::Transport(err.to_string())
        }
    }
}
