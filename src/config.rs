use crate::error::{ExchangeError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const LOGIN_URL: &str = "https://identitysso-cert.betfair.com/api/certlogin";
pub const BETTING_URL: &str = "https://api.betfair.com/exchange/betting/json-rpc/v1";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw client settings. The credential fields stay optional here so that
/// [`ExchangeClient::new`](crate::ExchangeClient::new) can name the one
/// that is missing.
#[derive(Clone, Default, Deserialize)]
pub struct BetfairConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub app_key: Option<String>,
    /// PEM file with the client certificate followed by its private key
    pub cert_path: Option<String>,
    pub login_url: Option<String>,
    pub rpc_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for BetfairConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BetfairConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("app_key", &self.app_key)
            .field("cert_path", &self.cert_path)
            .field("login_url", &self.login_url)
            .field("rpc_url", &self.rpc_url)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl BetfairConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        app_key: impl Into<String>,
        cert_path: impl Into<String>,
    ) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            app_key: Some(app_key.into()),
            cert_path: Some(cert_path.into()),
            ..Default::default()
        }
    }

    /// Read settings from `BETFAIR_*` environment variables. Unset
    /// variables are left as `None` and reported when the client is built.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        let secs = |name: &str| var(name).and_then(|value| value.parse().ok());
        Self {
            username: var("BETFAIR_USERNAME"),
            password: var("BETFAIR_PASSWORD"),
            app_key: var("BETFAIR_APP_KEY"),
            cert_path: var("BETFAIR_CERT_PATH"),
            login_url: var("BETFAIR_LOGIN_URL"),
            rpc_url: var("BETFAIR_RPC_URL"),
            connect_timeout_secs: secs("BETFAIR_CONNECT_TIMEOUT_SECS"),
            timeout_secs: secs("BETFAIR_TIMEOUT_SECS"),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            login_url: self.login_url.clone().unwrap_or(defaults.login_url),
            rpc_url: self.rpc_url.clone().unwrap_or(defaults.rpc_url),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// Login and RPC URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub login_url: String,
    pub rpc_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login_url: LOGIN_URL.to_string(),
            rpc_url: BETTING_URL.to_string(),
        }
    }
}

/// Validated credentials held by the client
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub app_key: String,
    pub cert_path: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("app_key", &self.app_key)
            .field("cert_path", &self.cert_path)
            .finish()
    }
}

impl Credentials {
    /// Check that every credential is present and the certificate file can be read
    pub fn validate(config: &BetfairConfig) -> Result<Self> {
        let credentials = Self {
            username: required(&config.username, "username")?,
            password: required(&config.password, "password")?,
            app_key: required(&config.app_key, "app_key")?,
            cert_path: required(&config.cert_path, "cert_path")?,
        };
        check_readable(&credentials.cert_path)?;
        Ok(credentials)
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String> {
    match value.as_deref() {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ExchangeError::Configuration(format!(
            "{} is missing from the configuration",
            field
        ))),
    }
}

fn check_readable(path: &str) -> Result<()> {
    let unreadable = |reason: String| {
        ExchangeError::Configuration(format!(
            "certificate file {} does not exist or is not readable: {}",
            path, reason
        ))
    };

    let metadata = fs::metadata(path).map_err(|e| unreadable(e.to_string()))?;
    if !metadata.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }
    fs::File::open(path).map_err(|e| unreadable(e.to_string()))?;
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub betfair: BetfairConfig,
}

impl Config {
    /// Load `config.toml` from the working directory
    pub fn new() -> Result<Self> {
        Self::from_file("config.toml")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&config_str)?;
        info!("Config: {:?}", config);
        Ok(config)
    }
}
