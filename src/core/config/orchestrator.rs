use crate::core::config::data::Config;
use crate::core::config::io::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use tracing::debug;

#[derive(Default)]
pub(crate) struct ConfigCacheState {
    config: Option<Config>,
    modified: Option<SystemTime>,
}

/// Caches the parsed config file and reloads it when its mtime changes.
pub(crate) struct ConfigOrchestrator {
    path: PathBuf,
    state: Mutex<ConfigCacheState>,
}

pub(crate) static CONFIG_ORCHESTRATOR: LazyLock<Option<ConfigOrchestrator>> =
    LazyLock::new(|| Config::get_config_path().ok().map(ConfigOrchestrator::new));

impl ConfigOrchestrator {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(ConfigCacheState::default()),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn load_with_cache(&self) -> Result<Config, ConfigError> {
        let mut state = self.lock();
        self.refresh(&mut state)?;
        Ok(state.config.clone().unwrap_or_default())
    }

    pub(crate) fn persist(&self, config: Config) -> Result<(), ConfigError> {
        config.save_to_path(&self.path)?;
        let mut state = self.lock();
        state.modified = Self::modified_time(&self.path);
        state.config = Some(config);
        Ok(())
    }

    pub(crate) fn mutate<F, T>(&self, mutator: F) -> Result<T, ConfigError>
    where
        F: FnOnce(&mut Config) -> Result<T, ConfigError>,
    {
        let mut working = self.load_with_cache()?;
        let result = mutator(&mut working)?;
        self.persist(working)?;
        Ok(result)
    }

    fn refresh(&self, state: &mut ConfigCacheState) -> Result<(), ConfigError> {
        let disk_modified = Self::modified_time(&self.path);
        if state.config.is_none() || state.modified != disk_modified {
            debug!(path = %self.path.display(), "loading config file");
            state.config = Some(Config::load_from_path(&self.path)?);
            state.modified = disk_modified;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ConfigCacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn modified_time(path: &Path) -> Option<SystemTime> {
        fs::metadata(path).ok()?.modified().ok()
    }
}

fn default_orchestrator() -> Result<&'static ConfigOrchestrator, ConfigError> {
    CONFIG_ORCHESTRATOR.as_ref().ok_or(ConfigError::NoConfigDir)
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        default_orchestrator()?.load_with_cache()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        default_orchestrator()?.persist(self.clone())
    }

    pub fn mutate<F, T>(mutator: F) -> Result<T, ConfigError>
    where
        F: FnOnce(&mut Config) -> Result<T, ConfigError>,
    {
        default_orchestrator()?.mutate(mutator)
    }

    /// Location of the config file, for display.
    pub fn location() -> Result<PathBuf, ConfigError> {
        Ok(default_orchestrator()?.path().to_path_buf())
    }
}
