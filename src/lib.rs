//! # betfair-rpc
//!
//! A small client for the Betfair Exchange JSON-RPC API. It logs in with a
//! client certificate, caches the session token, and wraps operation
//! parameters in a JSON-RPC envelope. An error reported by the API clears
//! the cached token, so the next call logs in again.
//!
//! ## Quick Start
//!
//! ```no_run
//! use betfair_rpc::{BetfairConfig, ExchangeClient};
//!
//! # async fn example() -> betfair_rpc::Result<()> {
//! let config = BetfairConfig::new("username", "password", "app_key", "/path/to/client.pem");
//! let mut client = ExchangeClient::new(config)?;
//!
//! // Logs in on first use
//! let response = client.request("listEventTypes", r#"{"filter":{}}"#).await?;
//! println!("{:?}", response.result());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Settings can also be read from `config.toml`:
//!
//! ```toml
//! [betfair]
//! username = "your_username"
//! password = "your_password"
//! app_key = "your_app_key"
//! cert_path = "/path/to/client.pem"
//! ```
//!
//! ## Certificate Setup
//!
//! The certificate file holds the client certificate followed by its private key:
//!
//! ```bash
//! cat client.crt client.key > client.pem
//! ```

pub mod api_client;
pub mod config;
pub mod dto;
pub mod error;
pub mod session;

// Re-export commonly used types at the crate root
pub use api_client::ExchangeClient;
pub use config::{BetfairConfig, Config};
pub use dto::{ErrorCode, RpcResponse};
pub use error::{ExchangeError, Result};
