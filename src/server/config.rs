const DEFAULT_TOKENS_PATH: &str = "/api/tokens/spotify";

/// Token store endpoint configuration.
///
/// Use [`from_env()`](TokenServiceConfig::from_env) for convention-based
/// setup, or [`new()`](TokenServiceConfig::new) with `with_*` methods for
/// full control.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    pub(super) tokens_path: String,
}

impl TokenServiceConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens_path: DEFAULT_TOKENS_PATH.into(),
        }
    }

    /// Create a config from environment variables.
    ///
    /// # Optional env vars
    /// - `TOKENS_PATH`: Override the endpoint path (default `/api/tokens/spotify`)
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(path) = std::env::var("TOKENS_PATH") {
            config = config.with_tokens_path(path);
        }
        config
    }

    /// Override the endpoint path.
    #[must_use]
    pub fn with_tokens_path(mut self, path: impl Into<String>) -> Self {
        self.tokens_path = path.into();
        self
    }
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}
