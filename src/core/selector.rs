//! Which saved configuration new messages are sent with.

use thiserror::Error;
use tracing::debug;

use crate::core::model_config::ModelConfiguration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub config_id: String,
    /// Set when the user picked this configuration by hand. Explicit picks
    /// survive refreshes for as long as the configuration exists.
    pub explicit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("No model configurations are available. Add one with 'veritas configs add'.")]
    NoConfigurations,
    #[error("Model configuration '{requested}' not found. Available configurations: {available}")]
    NotFound { requested: String, available: String },
}

/// Computes the selection for a freshly fetched collection.
///
/// An explicit choice that still exists is kept. Otherwise the single
/// configuration flagged as default wins; when none or several are flagged
/// the first configuration in the collection's order is used. An empty
/// collection has no selection.
pub fn resolve_selection(
    configs: &[ModelConfiguration],
    previous: Option<&Selection>,
) -> Option<Selection> {
    if let Some(previous) = previous.filter(|selection| selection.explicit) {
        if configs.iter().any(|config| config.id == previous.config_id) {
            return Some(previous.clone());
        }
    }

    let mut defaults = configs.iter().filter(|config| config.is_default);
    let chosen = match (defaults.next(), defaults.next()) {
        (Some(only), None) => Some(only),
        _ => configs.first(),
    }?;

    Some(Selection {
        config_id: chosen.id.clone(),
        explicit: false,
    })
}

/// Holds the current [`Selection`] and re-derives it when the collection
/// changes.
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    current: Option<Selection>,
}

impl ModelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.current
            .as_ref()
            .map(|selection| selection.config_id.as_str())
    }

    pub fn can_submit(&self) -> bool {
        self.current.is_some()
    }

    /// Re-evaluates after the configuration collection was replaced.
    pub fn reconcile(&mut self, configs: &[ModelConfiguration]) {
        let next = resolve_selection(configs, self.current.as_ref());
        if next != self.current {
            debug!(
                from = ?self.selected_id(),
                to = ?next.as_ref().map(|s| s.config_id.as_str()),
                "model selection changed"
            );
        }
        self.current = next;
    }

    /// Marks a configuration, looked up by id or by case-insensitive name,
    /// as the user's explicit choice.
    pub fn choose<'a>(
        &mut self,
        configs: &'a [ModelConfiguration],
        id_or_name: &str,
    ) -> Result<&'a ModelConfiguration, SelectError> {
        if configs.is_empty() {
            return Err(SelectError::NoConfigurations);
        }
        let wanted = id_or_name.trim();
        let found = configs
            .iter()
            .find(|config| config.id == wanted)
            .or_else(|| {
                configs
                    .iter()
                    .find(|config| config.name.eq_ignore_ascii_case(wanted))
            });

        match found {
            Some(config) => {
                self.current = Some(Selection {
                    config_id: config.id.clone(),
                    explicit: true,
                });
                Ok(config)
            }
            None => Err(SelectError::NotFound {
                requested: wanted.to_string(),
                available: configs
                    .iter()
                    .map(|config| format!("{} ({})", config.name, config.id))
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}
