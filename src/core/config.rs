//! Server configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.

/// Backend used when `BACKEND_URL` is not set
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Marketplace backend the `/api/v1` and `/repos` routes are proxied to
    /// Example: http://backend:8080
    pub backend_url: String,

    /// Whether `BACKEND_URL` was set explicitly
    pub backend_configured: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Self {
        Self::from_backend_url(std::env::var("BACKEND_URL").ok())
    }

    fn from_backend_url(value: Option<String>) -> Self {
        match value.map(|v| v.trim().trim_end_matches('/').to_string()) {
            Some(url) if !url.is_empty() => Self {
                backend_url: url,
                backend_configured: true,
            },
            _ => Self {
                backend_url: DEFAULT_BACKEND_URL.to_string(),
                backend_configured: false,
            },
        }
    }

    /// Absolute upstream URL for a proxied path and query
    pub fn upstream_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.backend_url, path_and_query)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
