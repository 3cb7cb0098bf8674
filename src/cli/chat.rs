//! Interactive line-based chat.

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::Backend;
use crate::cli::configs::print_configs;
use crate::cli::conversations::{print_summaries, with_loading_notice};
use crate::commands::{help_text, process_input, CommandResult};
use crate::core::app::App;
use crate::core::message::Message;
use crate::core::session::{ExchangeOutcome, SubmitRejected};

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run_chat<B: Backend>(
    app: &mut App<B>,
    model: Option<String>,
    conversation: Option<String>,
) -> Result<(), Box<dyn Error>> {
    for problem in app.bootstrap().await {
        eprintln!("⚠️  {problem}");
    }
    if let Some(model) = model {
        app.choose_model(&model)?;
    }
    if let Some(id) = conversation {
        let loading = app.watch_loading();
        with_loading_notice(loading, &mut io::stderr(), app.open_conversation(&id)).await?;
        print_transcript(app);
    }

    print_banner(app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        if execute(app, process_input(&line)).await == Flow::Quit {
            break;
        }
    }
    Ok(())
}

async fn execute<B: Backend>(app: &mut App<B>, command: CommandResult) -> Flow {
    match command {
        CommandResult::ProcessAsMessage(text) => send(app, &text).await,
        CommandResult::ShowHelp => println!("{}", help_text()),
        CommandResult::NewConversation => {
            app.start_new();
            println!("Started a new conversation.");
        }
        CommandResult::ListConversations => match app.refresh_conversations().await {
            Ok(()) => {
                let _ = print_summaries(&mut io::stdout(), app.summaries());
            }
            Err(err) => eprintln!("❌ Failed to load conversations: {err}"),
        },
        CommandResult::OpenConversation(id) => {
            let loading = app.watch_loading();
            let opened =
                with_loading_notice(loading, &mut io::stderr(), app.open_conversation(&id)).await;
            match opened {
                Ok(()) => print_transcript(app),
                Err(err) => eprintln!("❌ Failed to load conversation: {err}"),
            }
        }
        CommandResult::ListModels => {
            if let Err(err) = app.refresh_configs().await {
                eprintln!("❌ {err}");
            }
            let _ = print_configs(&mut io::stdout(), app.configs());
            if let Some(selected) = app.selected_config() {
                println!("Current model: {}", selected.name);
            }
        }
        CommandResult::ChooseModel(id_or_name) => match app.choose_model(&id_or_name) {
            Ok(name) => println!("Now chatting with {name}."),
            Err(err) => eprintln!("❌ {err}"),
        },
        CommandResult::ToggleLog => match app.logging.toggle_logging() {
            Ok(message) => println!("{message}"),
            Err(message) => eprintln!("❌ Log error: {message}"),
        },
        CommandResult::SetLogFile(path) => match app.logging.set_log_file(PathBuf::from(path)) {
            Ok(message) => println!("{message}"),
            Err(err) => eprintln!("❌ Log error: {err}"),
        },
        CommandResult::Usage(usage) => eprintln!("{usage}"),
        CommandResult::Quit => return Flow::Quit,
    }
    Flow::Continue
}

async fn send<B: Backend>(app: &mut App<B>, text: &str) {
    match app.submit(text).await {
        Ok(ExchangeOutcome::Replied { .. }) | Ok(ExchangeOutcome::Failed { .. }) => {
            if let Some(message) = app.session().messages().last() {
                print_message(app, message);
            }
        }
        Err(SubmitRejected::NoConfigSelected) => {
            eprintln!("❌ No model configuration is selected. Add one with 'veritas configs add'.");
        }
        Err(rejected) => eprintln!("❌ {rejected}"),
    }
}

fn print_banner<B: Backend>(app: &App<B>) {
    match app.selected_config() {
        Some(config) => println!("💬 Chatting with {} · /help for commands", config.name),
        None => println!("💬 No model configurations yet · add one with 'veritas configs add'"),
    }
}

fn print_transcript<B: Backend>(app: &App<B>) {
    for message in app.session().messages() {
        print_message(app, message);
    }
}

fn print_message<B: Backend>(app: &App<B>, message: &Message) {
    if message.is_user() {
        println!("You: {}", message.content);
    } else {
        println!("[{}] {}", app.speaker_label(message), message.content);
    }
    println!();
}
