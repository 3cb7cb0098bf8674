//! `veritas conversations`: browse stored conversation history.

use std::error::Error;
use std::future::Future;
use std::io::{self, Write};

use tokio::sync::watch;

use crate::api::Backend;
use crate::core::config_store::ConfigStore;
use crate::core::conversation::{Conversation, ConversationSummary};
use crate::core::directory::ConversationDirectory;
use crate::core::model_config::ModelConfiguration;

pub async fn list_conversations<B: Backend>(
    directory: &mut ConversationDirectory<B>,
) -> Result<(), Box<dyn Error>> {
    directory.refresh().await?;
    print_summaries(&mut io::stdout(), directory.summaries())?;
    Ok(())
}

pub async fn show_conversation<B: Backend>(
    directory: &mut ConversationDirectory<B>,
    store: &mut ConfigStore<B>,
    id: &str,
) -> Result<(), Box<dyn Error>> {
    let loading = directory.watch_loading();
    let conversation =
        with_loading_notice(loading, &mut io::stderr(), directory.load_full(id)).await?;
    // Labels degrade to "unknown model" if configurations cannot be listed
    if let Err(err) = store.list().await {
        tracing::warn!(error = %err, "showing conversation without model names");
    }
    print_conversation(&mut io::stdout(), &conversation, store.configs())?;
    Ok(())
}

/// Drives `work` to completion, writing a notice once `loading` turns on.
pub async fn with_loading_notice<F, W>(
    mut loading: watch::Receiver<bool>,
    out: &mut W,
    work: F,
) -> F::Output
where
    F: Future,
    W: Write,
{
    tokio::pin!(work);
    let mut watching = true;
    loop {
        tokio::select! {
            biased;
            changed = loading.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                } else if *loading.borrow_and_update() {
                    let _ = writeln!(out, "⏳ Loading conversation...");
                    watching = false;
                }
            }
            output = &mut work => return output,
        }
    }
}

pub fn print_summaries<W: Write>(out: &mut W, summaries: &[ConversationSummary]) -> io::Result<()> {
    if summaries.is_empty() {
        writeln!(out, "No conversations yet.")?;
        return Ok(());
    }
    for summary in summaries {
        let title = if summary.title.trim().is_empty() {
            "(untitled)"
        } else {
            summary.title.as_str()
        };
        writeln!(
            out,
            "  {}  {}  {}",
            summary.created_at.format("%Y-%m-%d %H:%M"),
            summary.id,
            title
        )?;
    }
    Ok(())
}

pub fn print_conversation<W: Write>(
    out: &mut W,
    conversation: &Conversation,
    configs: &[ModelConfiguration],
) -> io::Result<()> {
    writeln!(out, "💬 {} ({})", conversation.summary.title, conversation.id())?;
    writeln!(out)?;
    for message in &conversation.messages {
        writeln!(out, "{}: {}", message.speaker_label(configs), message.content)?;
        writeln!(out)?;
    }
    Ok(())
}
