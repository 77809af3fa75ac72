//! Frontend configuration

use config::{Config, ConfigError, Environment, File};
use jobboard_http::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// Durable storage key for the bearer token
    pub const TOKEN_KEY: &'static str = "token";

    /// Durable storage key for the serialized profile
    pub const USER_KEY: &'static str = "user";

    /// Shown when a request fails and the server gave no message
    pub const REQUEST_FAILED: &'static str = "Request failed";

    /// Shown when the retry after a session refresh fails
    pub const RETRY_FAILED: &'static str = "Request failed. Please try again.";
}

/// Prefix of environment variables overriding [`ClientSettings`]
pub const ENV_PREFIX: &str = "JOBBOARD";

/// Connection settings for a frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the marketplace API, including the `/api` prefix
    pub base_url: String,
    /// Network timeout in seconds; requests that exceed it fail as non-auth errors
    pub timeout_secs: u64,
    /// Where native frontends keep durable session state
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            data_dir: None,
        }
    }
}

impl ClientSettings {
    /// Layer defaults, an optional TOML file and `JOBBOARD_*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Directory holding the durable session file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("", "", "jobboard")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".jobboard"))
        })
    }
}
