pub mod app;
pub mod config;
pub mod config_store;
pub mod conversation;
pub mod directory;
pub mod message;
pub mod model_config;
pub mod selector;
pub mod session;
