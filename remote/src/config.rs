//! Connection settings for the hosted store.

use thiserror::Error;

/// Environment variable holding the project URL
pub const URL_VAR: &str = "SUPABASE_URL";

/// Environment variable holding the public anonymous key
pub const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but unusable
    #[error("Invalid value for {var}: {reason}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Project URL and public key, read once at startup
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL without trailing slash, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anonymous key sent with every request
    pub anon_key: String,
}

impl RemoteConfig {
    /// Builds a config from explicit values
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the URL is not http(s) or the key is blank.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let anon_key = anon_key.into().trim().to_string();

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: URL_VAR,
                reason: format!("expected an http(s) URL, got {url:?}"),
            });
        }
        if anon_key.is_empty() {
            return Err(ConfigError::Invalid {
                var: ANON_KEY_VAR,
                reason: "key is empty".to_string(),
            });
        }

        Ok(Self { url, anon_key })
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent variable, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(URL_VAR).map_err(|_| ConfigError::Missing(URL_VAR))?;
        let anon_key = std::env::var(ANON_KEY_VAR).map_err(|_| ConfigError::Missing(ANON_KEY_VAR))?;
        Self::new(url, anon_key)
    }

    /// REST endpoint for a table
    #[must_use]
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.url)
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .finish()
    }
}
