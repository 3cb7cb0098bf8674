//! Veritas is a terminal client for a Veritas chat backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the backend's REST payloads, the [`api::Backend`] trait
//!   the rest of the crate talks through, and its `reqwest` implementation.
//! - [`core`] owns client state: saved model configurations, the model
//!   selector, the conversation list and the active chat session.
//! - [`commands`] parses the slash commands typed at the chat prompt.
//! - [`cli`] parses arguments and drives the interactive and one-shot modes.
//!
//! The binary (`src/main.rs`) only calls [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod utils;
