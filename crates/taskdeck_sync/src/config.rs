//! Configuration for the sync engine and its REST backend.

use std::time::Duration;
use taskdeck_protocol::DEFAULT_PAGE_SIZE;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a taskdeck client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST service (e.g., "http://localhost:8000").
    pub base_url: String,
    /// Request timeout enforced by the transport.
    pub timeout: Duration,
    /// Bearer token sent with every request, if any.
    pub auth_token: Option<String>,
    /// Page size of the initial filters.
    pub default_page_size: u32,
    /// User agent header.
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration for the given service URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            auth_token: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            user_agent: concat!("taskdeck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Sets the initial page size. Zero is ignored.
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        if size > 0 {
            self.default_page_size = size;
        }
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8000")
    }
}
