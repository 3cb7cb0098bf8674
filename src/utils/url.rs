//! Backend address normalization.

/// Trims whitespace and trailing slashes from a base address.
///
/// ```
/// use veritas::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8080"), "http://localhost:8080");
/// assert_eq!(normalize_base_url(" http://localhost:8080///"), "http://localhost:8080");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Whether `base_url` uses a scheme the HTTP client can talk to.
pub fn is_http_url(base_url: &str) -> bool {
    reqwest::Url::parse(base_url.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}
