use super::data::{Config, ConfigKey};
use super::defaults::{resolve_backend_url, DEFAULT_BACKEND_URL};
use super::io::ConfigError;
use super::orchestrator::ConfigOrchestrator;
use crate::core::model_config::Provider;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn config_orchestrator_detects_external_updates() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let orchestrator = ConfigOrchestrator::new(config_path.clone());

    orchestrator
        .mutate(|config| config.set(ConfigKey::BackendUrl, "http://first:8080"))
        .expect("mutate failed");

    let persisted = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(persisted.backend_url.as_deref(), Some("http://first:8080"));

    let cached = orchestrator.load_with_cache().expect("cached load failed");
    assert_eq!(cached.backend_url.as_deref(), Some("http://first:8080"));

    std::thread::sleep(Duration::from_millis(1100));

    let external = Config {
        backend_url: Some("http://second:8080".to_string()),
        ..Default::default()
    };
    external
        .save_to_path(&config_path)
        .expect("external save failed");

    let reloaded = orchestrator.load_with_cache().expect("reload failed");
    assert_eq!(reloaded.backend_url.as_deref(), Some("http://second:8080"));
}

#[test]
fn missing_config_file_loads_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
}

#[test]
fn save_creates_parent_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("dir").join("config.toml");
    let config = Config {
        default_provider: Some("anthropic".to_string()),
        ..Default::default()
    };

    config.save_to_path(&config_path).expect("save failed");

    let loaded = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(loaded, config);
}

#[test]
fn malformed_file_reports_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "backend_url = [").expect("write failed");

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn set_and_unset_validate_values() {
    let mut config = Config::default();

    config
        .set(ConfigKey::BackendUrl, " https://veritas.example.com/ ")
        .unwrap();
    assert_eq!(
        config.backend_url.as_deref(),
        Some("https://veritas.example.com")
    );
    assert!(matches!(
        config.set(ConfigKey::BackendUrl, "not a url"),
        Err(ConfigError::InvalidValue { .. })
    ));

    config.set(ConfigKey::DefaultProvider, "Anthropic").unwrap();
    assert_eq!(config.default_provider.as_deref(), Some("anthropic"));
    assert_eq!(config.preferred_provider(), Provider::Anthropic);
    assert!(config.set(ConfigKey::DefaultProvider, "mistral").is_err());

    config.unset(ConfigKey::DefaultProvider);
    assert_eq!(config.preferred_provider(), Provider::OpenAi);
}

#[test]
fn config_keys_accept_either_separator() {
    assert_eq!("backend_url".parse::<ConfigKey>().unwrap(), ConfigKey::BackendUrl);
    assert_eq!(
        "Default-Provider".parse::<ConfigKey>().unwrap(),
        ConfigKey::DefaultProvider
    );
    let err = "theme".parse::<ConfigKey>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown config key 'theme'. Available keys: backend-url, default-provider"
    );
}

#[test]
fn backend_url_resolution_order() {
    let config = Config {
        backend_url: Some("http://from-file:8080".to_string()),
        ..Default::default()
    };

    assert_eq!(
        resolve_backend_url(Some("http://flag:1/"), Some("http://env:2"), &config),
        "http://flag:1"
    );
    assert_eq!(
        resolve_backend_url(None, Some("http://env:2"), &config),
        "http://env:2"
    );
    assert_eq!(
        resolve_backend_url(Some("  "), None, &config),
        "http://from-file:8080"
    );
    assert_eq!(
        resolve_backend_url(None, None, &Config::default()),
        DEFAULT_BACKEND_URL
    );
}
