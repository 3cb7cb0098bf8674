use super::CommandResult;

pub type CommandHandler = fn(CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    /// The argument string, or `None` when nothing follows the command.
    pub fn rest(&self) -> Option<&'a str> {
        Some(self.args).filter(|args| !args.is_empty())
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "new",
        usage: "/new",
        help: "Start a new conversation.",
        handler: super::handle_new,
    },
    Command {
        name: "history",
        usage: "/history",
        help: "List stored conversations.",
        handler: super::handle_history,
    },
    Command {
        name: "open",
        usage: "/open <id>",
        help: "Continue a stored conversation.",
        handler: super::handle_open,
    },
    Command {
        name: "models",
        usage: "/models",
        help: "List saved model configurations.",
        handler: super::handle_models,
    },
    Command {
        name: "model",
        usage: "/model <id|name>",
        help: "Send the next messages with another configuration.",
        handler: super::handle_model,
    },
    Command {
        name: "log",
        usage: "/log [file]",
        help: "Toggle the transcript log or start logging to a file.",
        handler: super::handle_log,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
