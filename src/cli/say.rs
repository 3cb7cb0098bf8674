//! One-shot `say` command: a single exchange without the interactive prompt.

use std::error::Error;

use crate::api::Backend;
use crate::core::app::App;
use crate::core::session::ExchangeOutcome;

pub async fn run_say<B: Backend>(
    app: &mut App<B>,
    prompt: Vec<String>,
    model: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: veritas say <prompt>".into());
    }

    app.refresh_configs().await?;
    if let Some(model) = model {
        app.choose_model(&model)?;
    }

    match app.submit(&prompt).await? {
        ExchangeOutcome::Replied { .. } => {
            if let Some(reply) = app.session().messages().last() {
                println!("{}", reply.content);
            }
            Ok(())
        }
        ExchangeOutcome::Failed { error } => Err(error.into()),
    }
}
