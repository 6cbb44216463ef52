//! Server configuration.

/// Configuration for the Save Service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Whether loads and saves need a signed-in session.
    pub auth_required: bool,
    /// Largest accepted save request, in bytes of JSON.
    pub max_payload_bytes: usize,
}

impl ServerConfig {
    /// Creates a configuration that accepts every session.
    pub fn new() -> Self {
        Self {
            auth_required: false,
            max_payload_bytes: 5 * 1024 * 1024,
        }
    }

    /// Requires a signed-in session for loads and saves.
    pub fn with_auth_required(mut self, required: bool) -> Self {
        self.auth_required = required;
        self
    }

    /// Sets the largest accepted save request.
    pub fn with_max_payload_bytes(mut self, max: usize) -> Self {
        self.max_payload_bytes = max;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
