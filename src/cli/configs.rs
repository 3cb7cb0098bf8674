//! `veritas configs`: manage the model configurations saved on the backend.

use std::error::Error;
use std::io::{self, BufRead, Write};

use crate::api::Backend;
use crate::cli::prompt::{ask, ask_with_default, ask_yes_no, confirm_on_terminal};
use crate::core::config::Config;
use crate::core::config_store::{ConfigStore, RemoveOutcome};
use crate::core::model_config::{ConfigForm, ModelConfiguration, Provider, TestOutcome};

pub async fn list_configs<B: Backend>(store: &mut ConfigStore<B>) -> Result<(), Box<dyn Error>> {
    let configs = store.list().await?;
    print_configs(&mut io::stdout(), configs)?;
    Ok(())
}

pub fn print_configs<W: Write>(out: &mut W, configs: &[ModelConfiguration]) -> io::Result<()> {
    if configs.is_empty() {
        writeln!(out, "No model configurations yet. Add one with 'veritas configs add'.")?;
        return Ok(());
    }
    writeln!(out, "🤖 Model configurations")?;
    writeln!(out)?;
    for config in configs {
        let marker = if config.is_default { " (default)" } else { "" };
        writeln!(out, "  • {}{}", config.name, marker)?;
        writeln!(out, "    ID: {}", config.id)?;
        writeln!(
            out,
            "    Provider: {} · Model: {}",
            config.provider.display_name(),
            config.model_id
        )?;
        if !config.base_url.is_empty() {
            writeln!(out, "    Base URL: {}", config.base_url)?;
        }
        writeln!(
            out,
            "    Updated: {}",
            config.updated_at.format("%Y-%m-%d %H:%M UTC")
        )?;
    }
    Ok(())
}

pub async fn add_config<B: Backend>(store: &mut ConfigStore<B>) -> Result<(), Box<dyn Error>> {
    let provider = Config::load().map(|c| c.preferred_provider()).unwrap_or_default();
    let mut form = ConfigForm::blank(provider);
    edit_and_save(store, &mut form).await?;
    println!("✅ Saved configuration '{}'", form.name.trim());
    Ok(())
}

pub async fn edit_config<B: Backend>(
    store: &mut ConfigStore<B>,
    id: &str,
) -> Result<(), Box<dyn Error>> {
    store.list().await?;
    let Some(existing) = store.find(id) else {
        return Err(format!("Model configuration '{id}' not found").into());
    };
    let mut form = ConfigForm::for_edit(existing);
    edit_and_save(store, &mut form).await?;
    println!("✅ Updated configuration '{}'", form.name.trim());
    Ok(())
}

pub async fn remove_config<B: Backend>(
    store: &mut ConfigStore<B>,
    id: &str,
    assume_yes: bool,
) -> Result<(), Box<dyn Error>> {
    // Listing first lets the prompt show the configuration's name
    store.list().await?;
    let outcome = store
        .remove(id, |question| assume_yes || confirm_on_terminal(question))
        .await?;
    match outcome {
        RemoveOutcome::Removed => println!("✅ Deleted configuration '{id}'"),
        RemoveOutcome::Cancelled => println!("Cancelled."),
    }
    Ok(())
}

/// Probes connection settings without saving anything.
pub async fn test_config<B: Backend>(store: &mut ConfigStore<B>) -> Result<(), Box<dyn Error>> {
    let provider = Config::load().map(|c| c.preferred_provider()).unwrap_or_default();
    let mut form = ConfigForm::blank(provider);
    {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        fill_connection(&mut input, &mut output, &mut form)?;
    }
    let outcome = store.test_form(&form).await?;
    print_outcome(&mut io::stdout(), &outcome)?;
    Ok(())
}

async fn edit_and_save<B: Backend>(
    store: &mut ConfigStore<B>,
    form: &mut ConfigForm,
) -> Result<(), Box<dyn Error>> {
    {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        fill_form(&mut input, &mut output, form)?;
        form.validate()?;
    }

    let wants_test = !form.api_key.trim().is_empty() && {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        ask_yes_no(&mut input, &mut io::stdout(), "Test the connection before saving?", true)?
    };
    if wants_test {
        let outcome = store.test_form(form).await?;
        print_outcome(&mut io::stdout(), &outcome)?;
        if !outcome.success {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            if !ask_yes_no(&mut input, &mut io::stdout(), "Save anyway?", false)? {
                return Err("Configuration not saved".into());
            }
        }
    }

    store.save(form).await?;
    Ok(())
}

/// Prompts for every field of `form`, showing current values as defaults.
pub fn fill_form<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    form: &mut ConfigForm,
) -> io::Result<()> {
    form.name = ask_with_default(input, output, "Name", &form.name)?;
    fill_connection(input, output, form)?;
    form.is_default = ask_yes_no(input, output, "Use as the default model?", form.is_default)?;
    Ok(())
}

fn fill_connection<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    form: &mut ConfigForm,
) -> io::Result<()> {
    loop {
        let answer = ask_with_default(
            input,
            output,
            "Provider (openai, anthropic, custom)",
            form.provider().as_str(),
        )?;
        match answer.parse::<Provider>() {
            Ok(provider) => {
                form.set_provider(provider);
                break;
            }
            Err(message) => writeln!(output, "{message}")?,
        }
    }
    form.base_url = ask_with_default(input, output, "Base URL", &form.base_url)?;
    form.model_id = ask_with_default(input, output, "Model ID", &form.model_id)?;
    form.api_key = if form.is_edit() {
        ask(input, output, "API key (leave empty to keep the stored key): ")?
    } else {
        ask(input, output, "API key: ")?
    };
    Ok(())
}

pub fn print_outcome<W: Write>(out: &mut W, outcome: &TestOutcome) -> io::Result<()> {
    let icon = if outcome.success { "✅" } else { "❌" };
    writeln!(out, "{icon} {}", outcome.message)?;
    for (key, value) in &outcome.details {
        writeln!(out, "    {key}: {value}")?;
    }
    if let Some(details) = &outcome.error_details {
        writeln!(out, "    {details}")?;
    }
    Ok(())
}
