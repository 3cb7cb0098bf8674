//! Plain-text transcript of the chat, enabled with `--log` or `/log`.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::message::Message;

#[derive(Debug, Default)]
pub struct LoggingState {
    file_path: Option<PathBuf>,
    is_active: bool,
}

impl LoggingState {
    /// Starts logging right away when a file is given.
    pub fn new(log_file: Option<PathBuf>) -> std::io::Result<Self> {
        let mut logging = LoggingState::default();
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: PathBuf) -> std::io::Result<String> {
        // Fail now rather than on the first message
        OpenOptions::new().create(true).append(true).open(&path)?;

        let message = format!("Logging enabled to: {}", path.display());
        self.file_path = Some(path);
        self.is_active = true;
        Ok(message)
    }

    pub fn toggle_logging(&mut self) -> Result<String, String> {
        let Some(path) = &self.file_path else {
            return Err(
                "No log file specified. Use /log <filename> to enable logging first.".to_string(),
            );
        };
        self.is_active = !self.is_active;
        if self.is_active {
            Ok(format!("Logging resumed to: {}", path.display()))
        } else {
            Ok(format!("Logging paused (file: {})", path.display()))
        }
    }

    /// Appends one message under its speaker label. A no-op while logging is
    /// paused or disabled.
    pub fn log_message(&self, message: &Message, speaker: &str) -> std::io::Result<()> {
        match (&self.file_path, self.is_active) {
            (Some(path), true) => write_entry(path, speaker, &message.content),
            _ => Ok(()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        let file_name = |path: &Path| {
            path.file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }
}

fn write_entry(path: &Path, speaker: &str, content: &str) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);

    for line in format!("{speaker}: {content}").lines() {
        writeln!(writer, "{line}")?;
    }
    // Blank line between entries, matching the screen
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn messages_are_appended_with_speaker_labels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log");
        let logging = LoggingState::new(Some(path.clone())).unwrap();

        logging.log_message(&Message::user("Hello"), "You").unwrap();
        logging
            .log_message(&Message::assistant("Hi\nthere", "cfg-1"), "GPT-4o")
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "You: Hello\n\nGPT-4o: Hi\nthere\n\n");
        assert_eq!(logging.get_status_string(), "active (chat.log)");
    }

    #[test]
    fn paused_logging_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log");
        let mut logging = LoggingState::new(Some(path.clone())).unwrap();

        let paused = logging.toggle_logging().unwrap();
        assert!(paused.starts_with("Logging paused"));
        logging.log_message(&Message::user("secret"), "You").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
        assert_eq!(logging.get_status_string(), "paused (chat.log)");
    }

    #[test]
    fn toggling_without_a_file_is_an_error() {
        let mut logging = LoggingState::default();
        assert!(logging.toggle_logging().is_err());
        assert!(!logging.is_active());
        assert_eq!(logging.get_status_string(), "disabled");
    }
}
