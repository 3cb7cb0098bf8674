//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat;
pub mod configs;
pub mod conversations;
pub mod prompt;
pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::HttpBackend;
use crate::cli::chat::run_chat;
use crate::cli::say::run_say;
use crate::core::app::App;
use crate::core::config::{path_display, resolve_backend_url, Config, ConfigKey, BACKEND_URL_ENV};
use crate::core::config_store::ConfigStore;
use crate::core::directory::ConversationDirectory;
use crate::utils::logging::LoggingState;
use crate::utils::url::is_http_url;

pub const LOG_FILTER_ENV: &str = "VERITAS_LOG";

#[derive(Parser)]
#[command(name = "veritas")]
#[command(version)]
#[command(about = "Terminal client for a Veritas chat backend")]
#[command(
    long_about = "Veritas chats with AI models through a Veritas backend. Model configurations \
(provider, base URL, model ID and API key) are stored on the backend and can be tested before \
they are saved; conversations are stored there too.\n\n\
Environment Variables:\n\
  VERITAS_BACKEND_URL   Backend address (default http://localhost:8080)\n\
  VERITAS_LOG           Diagnostic log filter, e.g. debug or veritas=trace\n\n\
Commands inside the chat:\n\
  /help             Show available commands\n\
  /new              Start a new conversation\n\
  /open <id>        Continue a stored conversation\n\
  /model <name>     Switch model configuration\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base address, overriding VERITAS_BACKEND_URL and the config file
    #[arg(short = 'b', long, global = true, value_name = "URL")]
    pub backend: Option<String>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat {
        /// Model configuration to use, by ID or name
        #[arg(short = 'm', long, value_name = "MODEL")]
        model: Option<String>,
        /// Continue a stored conversation
        #[arg(short = 'c', long, value_name = "ID")]
        conversation: Option<String>,
    },
    /// Send a single message and print the reply
    Say {
        /// Model configuration to use, by ID or name
        #[arg(short = 'm', long, value_name = "MODEL")]
        model: Option<String>,
        /// The message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Manage model configurations stored on the backend
    Configs {
        #[command(subcommand)]
        command: ConfigsCommand,
    },
    /// Browse stored conversations
    Conversations {
        #[command(subcommand)]
        command: ConversationsCommand,
    },
    /// Set configuration values, or print them when no key is given
    Set {
        /// Configuration key to set (backend-url, default-provider)
        key: Option<String>,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigsCommand {
    /// List saved model configurations
    List,
    /// Create a model configuration interactively
    Add,
    /// Edit a model configuration; the stored API key is kept unless replaced
    Edit { id: String },
    /// Delete a model configuration
    Remove {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Test connection settings without saving them
    Test,
}

#[derive(Subcommand)]
pub enum ConversationsCommand {
    /// List stored conversations
    List,
    /// Print one conversation with its history
    Show { id: String },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);
    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Already installed when embedded in another binary
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn connect(flag: Option<&str>) -> Result<Arc<HttpBackend>, Box<dyn Error>> {
    let config = Config::load().unwrap_or_else(|err| {
        eprintln!("⚠️  {err}");
        Config::default()
    });
    let env = std::env::var(BACKEND_URL_ENV).ok();
    let url = resolve_backend_url(flag, env.as_deref(), &config);
    if !is_http_url(&url) {
        return Err(format!("Invalid backend address '{url}'. Expected http:// or https://").into());
    }
    tracing::debug!(%url, "using backend");
    Ok(Arc::new(HttpBackend::new(&url)))
}

fn print_settings() -> Result<(), Box<dyn Error>> {
    Config::load()?.print_all();
    println!("  file: {}", path_display(Config::location()?));
    Ok(())
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.unwrap_or(Commands::Chat {
        model: None,
        conversation: None,
    });

    match command {
        Commands::Chat {
            model,
            conversation,
        } => {
            let backend = connect(args.backend.as_deref())?;
            let mut app = App::new(backend, LoggingState::new(args.log)?);
            run_chat(&mut app, model, conversation).await
        }
        Commands::Say { model, prompt } => {
            let backend = connect(args.backend.as_deref())?;
            let mut app = App::new(backend, LoggingState::new(args.log)?);
            run_say(&mut app, prompt, model).await
        }
        Commands::Configs { command } => {
            let mut store = ConfigStore::new(connect(args.backend.as_deref())?);
            match command {
                ConfigsCommand::List => configs::list_configs(&mut store).await,
                ConfigsCommand::Add => configs::add_config(&mut store).await,
                ConfigsCommand::Edit { id } => configs::edit_config(&mut store, &id).await,
                ConfigsCommand::Remove { id, yes } => {
                    configs::remove_config(&mut store, &id, yes).await
                }
                ConfigsCommand::Test => configs::test_config(&mut store).await,
            }
        }
        Commands::Conversations { command } => {
            let backend = connect(args.backend.as_deref())?;
            let mut directory = ConversationDirectory::new(backend.clone());
            match command {
                ConversationsCommand::List => {
                    conversations::list_conversations(&mut directory).await
                }
                ConversationsCommand::Show { id } => {
                    let mut store = ConfigStore::new(backend);
                    conversations::show_conversation(&mut directory, &mut store, &id).await
                }
            }
        }
        Commands::Set { key, value } => {
            let Some(key) = key else {
                print_settings()?;
                return Ok(());
            };
            let key: ConfigKey = key.parse()?;
            if value.is_empty() {
                print_settings()?;
                return Ok(());
            }
            let value = value.join(" ");
            let stored = Config::mutate(|config| {
                config.set(key, &value)?;
                Ok(match key {
                    ConfigKey::BackendUrl => config.backend_url.clone(),
                    ConfigKey::DefaultProvider => config.default_provider.clone(),
                })
            })?;
            println!("✅ Set {key} to: {}", stored.unwrap_or(value));
            Ok(())
        }
        Commands::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            Config::mutate(|config| {
                config.unset(key);
                Ok(())
            })?;
            println!("✅ Unset {key}");
            Ok(())
        }
    }
}
