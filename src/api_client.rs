use crate::config::{BetfairConfig, Credentials, Endpoints};
use crate::dto::rpc::{LoginResponse, RpcEnvelope, RpcResponse};
use crate::error::{ExchangeError, Result};
use crate::session::{redact, SessionCache};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Identity};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::value::RawValue;
use std::time::Duration;
use tracing::{debug, info, warn};

const APPLICATION_JSON: &str = "application/json";

/// Client for the Betfair JSON-RPC API.
///
/// Logs in with the client certificate on first use and caches the session
/// token. Any error reported by the RPC endpoint clears the cached token, so
/// the next call logs in again. Methods that may touch the token take
/// `&mut self`; wrap the client in a `tokio::sync::Mutex` to share it
/// between tasks.
pub struct ExchangeClient {
    client: Client,
    credentials: Credentials,
    app_key: HeaderValue,
    endpoints: Endpoints,
    connect_timeout: Duration,
    timeout: Duration,
    session: SessionCache,
}

impl ExchangeClient {
    /// Create a new client. No network traffic happens here.
    pub fn new(config: BetfairConfig) -> Result<Self> {
        let connect_timeout = config.connect_timeout();
        let timeout = config.timeout();

        let client = Client::builder()
            .use_rustls_tls()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ExchangeError::Capability(format!("could not initialise the HTTPS transport: {}", e))
            })?;

        let credentials = Credentials::validate(&config)?;
        let app_key = HeaderValue::from_str(&credentials.app_key).map_err(|_| {
            ExchangeError::Configuration("app_key is not a valid header value".to_string())
        })?;

        debug!("Exchange client created for {:?}", credentials);

        Ok(Self {
            client,
            credentials,
            app_key,
            endpoints: config.endpoints(),
            connect_timeout,
            timeout,
            session: SessionCache::new(),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Cached session token, without any network I/O
    pub fn session_token(&self) -> Option<&str> {
        self.session.token()
    }

    /// Time since the cached token was obtained
    pub fn session_age(&self) -> Option<Duration> {
        self.session.age()
    }

    /// Drop the cached token so the next call logs in again
    pub fn invalidate_session(&mut self) {
        if let Some(token) = self.session.invalidate() {
            info!("Session token {} invalidated", redact(&token));
        }
    }

    /// Return the session token, logging in when none is cached or when
    /// `force_refresh` is set. A forced refresh drops the cached token
    /// before logging in.
    pub async fn get_session_token(&mut self, force_refresh: bool) -> Result<String> {
        if force_refresh {
            if self.session.is_cached() {
                debug!("Dropping cached session token for a forced refresh");
            }
            self.session.invalidate();
        } else if let Some(token) = self.session.token() {
            return Ok(token.to_string());
        }

        let token = self.login().await?;
        self.session.store(token.clone());
        info!(
            "Logged in (login #{}), session token {}",
            self.session.login_count(),
            redact(&token)
        );
        Ok(token)
    }

    async fn login(&self) -> Result<String> {
        let cert_path = &self.credentials.cert_path;
        let pem = std::fs::read(cert_path)?;
        let identity = Identity::from_pem(&pem).map_err(|e| {
            ExchangeError::Configuration(format!("invalid client certificate {}: {}", cert_path, e))
        })?;

        // The certificate is only presented to the login endpoint
        let client = Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                ExchangeError::Configuration(format!("invalid client certificate {}: {}", cert_path, e))
            })?;

        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("X-Application", self.app_key.clone());
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));

        let form = [
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        debug!("Logging in as {}", self.credentials.username);

        let response = client
            .post(&self.endpoints.login_url)
            .headers(headers)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        debug!("Login response status: {}", status);

        let login: LoginResponse = serde_json::from_str(&response.text().await?)?;
        match login.token() {
            // Must be usable as the X-Authentication header
            Some(token) if HeaderValue::from_str(token).is_ok() => Ok(token.to_string()),
            Some(_) => Err(ExchangeError::Authentication(
                "login returned a session token that is not a valid header value".to_string(),
            )),
            None => Err(ExchangeError::Authentication(format!(
                "could not obtain a session token (loginStatus: {}); check configuration",
                login.login_status.as_deref().unwrap_or("none")
            ))),
        }
    }

    fn rpc_headers(&self, session_token: &str) -> Result<HeaderMap> {
        let token = HeaderValue::from_str(session_token).map_err(|_| {
            ExchangeError::Authentication("session token is not a valid header value".to_string())
        })?;

        let mut headers = HeaderMap::with_capacity(4);
        headers.insert("X-Application", self.app_key.clone());
        headers.insert("X-Authentication", token);
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        Ok(headers)
    }

    /// Call `SportsAPING/v1.0/<operation>` with `params`, which must already be
    /// JSON text and is sent unchanged.
    ///
    /// An error in the response clears the cached session token and is
    /// returned as [`ExchangeError::Rpc`]. There is no retry here.
    pub async fn request(&mut self, operation: &str, params: &str) -> Result<RpcResponse> {
        let params = RawValue::from_string(params.to_string())?;
        let session_token = self.get_session_token(false).await?;

        let envelope = RpcEnvelope::new(operation, &params);
        let body = serde_json::to_string(&envelope)?;
        debug!("API request: {}", body);

        let response = self
            .client
            .post(&self.endpoints.rpc_url)
            .headers(self.rpc_headers(&session_token)?)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        debug!("API response status: {}", status);

        let response_text = response.text().await?;
        debug!("API response: {}", response_text);

        if !status.is_success() {
            warn!("{} returned HTTP status {}", envelope.method(), status);
        }

        let response: RpcResponse = serde_json::from_str(&response_text)?;
        if let Some(error) = response.error() {
            self.session.invalidate();
            warn!(
                "{} failed with {} ({}); session token cleared",
                envelope.method(),
                error.message,
                error.code
            );
            return Err(ExchangeError::Rpc {
                message: error.message,
                code: error.code,
            });
        }

        Ok(response)
    }

    /// Like [`request`](Self::request), but after an RPC error logs in again
    /// and repeats the call once.
    pub async fn request_with_reauth(&mut self, operation: &str, params: &str) -> Result<RpcResponse> {
        match self.request(operation, params).await {
            Err(err) if err.is_rpc() => {
                info!("{} failed ({}), retrying with a new session", operation, err);
                self.request(operation, params).await
            }
            other => other,
        }
    }

    /// Typed wrapper around [`request`](Self::request): serialises `params`
    /// and deserialises the `result` member of the reply.
    pub async fn call<P, R>(&mut self, operation: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_string(params)?;
        let result = self
            .request(operation, &params)
            .await?
            .into_result()
            .ok_or_else(|| ExchangeError::MissingResult(operation.to_string()))?;
        Ok(serde_json::from_value(result)?)
    }
}
