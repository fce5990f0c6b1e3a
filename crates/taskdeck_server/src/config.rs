//! Server configuration.

use taskdeck_protocol::DEFAULT_PAGE_SIZE;

/// Configuration for the todo server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Page size used when a request carries none.
    pub default_page_size: u32,
    /// Largest page a single request may ask for.
    pub max_page_size: u32,
}

impl ServerConfig {
    /// Creates a configuration with the default limits.
    pub fn new() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: u32) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    /// Sets the maximum page size.
    pub fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size.max(1);
        self
    }

    /// Resolves the page size for a request.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        match requested {
            Some(0) | None => self.default_page_size,
            Some(size) => size,
        }
        .min(self.max_page_size)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
