use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::config::io::ConfigError;
use crate::core::model_config::Provider;
use crate::utils::url::normalize_base_url;

/// Client-side settings. Everything about model configurations lives on the
/// backend; this file only says where the backend is.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base address of the Veritas backend, e.g. `http://localhost:8080`
    pub backend_url: Option<String>,
    /// Provider preselected when `veritas configs add` opens a new form
    pub default_provider: Option<String>,
}

/// Keys accepted by `veritas set` and `veritas unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    BackendUrl,
    DefaultProvider,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 2] = [ConfigKey::BackendUrl, ConfigKey::DefaultProvider];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::BackendUrl => "backend-url",
            ConfigKey::DefaultProvider => "default-provider",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().replace('_', "-").to_ascii_lowercase();
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| ConfigError::UnknownKey(value.to_string()))
    }
}

impl Config {
    /// Stores a value for `key`, validating it first.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            ConfigKey::BackendUrl => {
                let normalized = normalize_base_url(value);
                reqwest::Url::parse(&normalized).map_err(|err| ConfigError::InvalidValue {
                    key,
                    message: format!("'{value}' is not a valid URL ({err})"),
                })?;
                self.backend_url = Some(normalized);
            }
            ConfigKey::DefaultProvider => {
                let provider: Provider = value
                    .parse()
                    .map_err(|message| ConfigError::InvalidValue { key, message })?;
                self.default_provider = Some(provider.as_str().to_string());
            }
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::BackendUrl => self.backend_url = None,
            ConfigKey::DefaultProvider => self.default_provider = None,
        }
    }

    /// Provider for new configuration forms. Unknown values fall back to the
    /// built-in default.
    pub fn preferred_provider(&self) -> Provider {
        self.default_provider
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or_default()
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
