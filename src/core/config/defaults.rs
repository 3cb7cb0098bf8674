use crate::core::config::data::Config;
use crate::utils::url::normalize_base_url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const BACKEND_URL_ENV: &str = "VERITAS_BACKEND_URL";

/// Picks the backend address: command-line flag, then environment, then the
/// config file, then [`DEFAULT_BACKEND_URL`]. Blank values are skipped.
pub fn resolve_backend_url(flag: Option<&str>, env: Option<&str>, config: &Config) -> String {
    [flag, env, config.backend_url.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(normalize_base_url)
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}
