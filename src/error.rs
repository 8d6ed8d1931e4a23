use std::io;

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serde_json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("tool execution failed: {0}")]
    ToolExecution(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("model error: {0}")]
    Model(String),

    #[error("model rate limited: {0}")]
    RateLimited(String),

    #[error("model auth rejected: {0}")]
    AuthRejected(String),
}

impl Error {
    /// Provider signals the caller may want to react to (switch model,
    /// back off) rather than treat as an ordinary stage failure.
    pub fn is_provider_signal(&self) -> bool {
        matches!(self, Error::RateLimited(_) | Error::AuthRejected(_))
    }
}

pub type Result<T> = core::result::Result<T, Error>;
