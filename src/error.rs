use crate::dto::rpc::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Errors returned by [`ExchangeClient`](crate::ExchangeClient) and the config loaders
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The HTTP/TLS transport could not be initialised
    #[error("Transport unavailable: {0}")]
    Capability(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Login went through but no usable session token came back
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Error reported by the RPC endpoint. The cached session token has
    /// already been cleared when this is returned.
    #[error("RPC error {code}: {message}")]
    Rpc { message: String, code: ErrorCode },

    #[error("No result in response to {0}")]
    MissingResult(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ExchangeError {
    /// True for errors reported by the remote endpoint itself
    pub fn is_rpc(&self) -> bool {
        matches!(self, ExchangeError::Rpc { .. })
    }
}
