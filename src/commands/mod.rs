//! Slash commands understood by the chat prompt.
//!
//! Parsing is synchronous and touches no state; the chat loop carries out
//! the returned [`CommandResult`].

mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    ProcessAsMessage(String),
    ShowHelp,
    NewConversation,
    ListConversations,
    OpenConversation(String),
    ListModels,
    ChooseModel(String),
    ToggleLog,
    SetLogFile(String),
    Quit,
    /// The command was recognized but used wrongly; show this line.
    Usage(&'static str),
}

pub fn process_input(input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(body) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = body.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => (command.handler)(CommandInvocation {
            input: trimmed,
            args,
        }),
        // Unknown commands are sent as ordinary text, e.g. "/etc/hosts?"
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

pub fn help_text() -> String {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut text = String::from("Commands:\n");
    for command in all_commands() {
        text.push_str(&format!("  {:<width$}  {}\n", command.usage, command.help));
    }
    text.push_str("Anything else is sent to the selected model.");
    text
}

fn handle_help(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ShowHelp
}

fn handle_new(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::NewConversation
}

fn handle_history(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ListConversations
}

fn handle_open(invocation: CommandInvocation<'_>) -> CommandResult {
    match invocation.rest() {
        Some(id) => CommandResult::OpenConversation(id.to_string()),
        None => CommandResult::Usage("Usage: /open <id>"),
    }
}

fn handle_models(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::ListModels
}

fn handle_model(invocation: CommandInvocation<'_>) -> CommandResult {
    match invocation.rest() {
        Some(id_or_name) => CommandResult::ChooseModel(id_or_name.to_string()),
        None => CommandResult::ListModels,
    }
}

fn handle_log(invocation: CommandInvocation<'_>) -> CommandResult {
    let mut parts = invocation.args.split_whitespace();
    match (parts.next(), parts.next()) {
        (None, _) => CommandResult::ToggleLog,
        (Some(file), None) => CommandResult::SetLogFile(file.to_string()),
        (Some(_), Some(_)) => CommandResult::Usage("Usage: /log [file]"),
    }
}

fn handle_quit(_invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}
