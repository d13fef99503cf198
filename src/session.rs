use std::time::{Duration, Instant};

/// Cached session token. Changed only by a successful login ([`store`](Self::store))
/// or an invalidation after an RPC error ([`invalidate`](Self::invalidate)).
#[derive(Debug, Default)]
pub struct SessionCache {
    token: Option<String>,
    obtained_at: Option<Instant>,
    logins: u32,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_cached(&self) -> bool {
        self.token.is_some()
    }

    pub fn store(&mut self, token: String) {
        self.token = Some(token);
        self.obtained_at = Some(Instant::now());
        self.logins += 1;
    }

    pub fn invalidate(&mut self) -> Option<String> {
        self.obtained_at = None;
        self.token.take()
    }

    /// Time since the cached token was obtained
    pub fn age(&self) -> Option<Duration> {
        self.obtained_at.map(|instant| instant.elapsed())
    }

    /// Number of successful logins over the lifetime of the cache
    pub fn login_count(&self) -> u32 {
        self.logins
    }
}

/// Shortened token for log output
pub(crate) fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{}...", prefix)
}
