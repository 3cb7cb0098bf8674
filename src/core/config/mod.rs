pub mod data;
pub mod defaults;
pub mod io;
pub mod orchestrator;
pub mod printing;

pub use data::{path_display, Config, ConfigKey};
pub use defaults::{resolve_backend_url, BACKEND_URL_ENV, DEFAULT_BACKEND_URL};
pub use io::ConfigError;

#[cfg(test)]
mod tests;
