use std::path::PathBuf;

use thiserror::Error;

/// Error type for persistence, configuration, and entitlement failures.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Free tier allows at most {limit} active subscriptions")]
    LimitReached { limit: usize },
}

pub type Result<T> = std::result::Result<T, SubscriptionError>;
