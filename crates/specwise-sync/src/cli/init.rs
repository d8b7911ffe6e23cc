/*
[INPUT]:  Interactive user input via CLI
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When SyncConfig schema changes
*/

use anyhow::{Context, Result, anyhow};
use console::style;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::path::PathBuf;

use specwise_sync::config::{ApiConfig, PollConfig, SyncConfig};

pub fn run_init(output: Option<PathBuf>) -> Result<()> {
    let output = match output.or_else(SyncConfig::default_path) {
        Some(path) => path,
        None => return Err(anyhow!("no config directory on this platform; pass --output")),
    };

    println!("{}", style("Welcome to Specwise Sync Init").bold().cyan());
    println!(
        "{}",
        style("This will guide you through creating a synchronizer configuration.").dim()
    );

    let theme = ColorfulTheme::default();
    let defaults = SyncConfig::default();

    if output.exists()
        && !Confirm::with_theme(&theme)
            .with_prompt(format!("{} exists. Overwrite?", output.display()))
            .default(false)
            .interact()?
    {
        println!("{}", style("Aborted.").yellow());
        return Ok(());
    }

    println!("\n{}", style("--- API ---").bold());
    let base_url: String = Input::with_theme(&theme)
        .with_prompt("API base URL")
        .default(defaults.api.base_url.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.starts_with("http://") || input.starts_with("https://") {
                Ok(())
            } else {
                Err("must start with http:// or https://")
            }
        })
        .interact_text()?;

    let timeout_secs: u64 = Input::with_theme(&theme)
        .with_prompt("Request timeout (seconds)")
        .default(defaults.api.timeout_secs)
        .interact_text()?;

    println!("\n{}", style("--- Polling ---").bold());
    let interval_ms: u64 = Input::with_theme(&theme)
        .with_prompt("Status poll interval (ms)")
        .default(defaults.poll.interval_ms)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if *input > 0 { Ok(()) } else { Err("must be greater than zero") }
        })
        .interact_text()?;

    let download_dir: String = Input::with_theme(&theme)
        .with_prompt("XML download directory (empty for system default)")
        .allow_empty(true)
        .interact_text()?;

    let config = SyncConfig {
        api: ApiConfig {
            base_url,
            timeout_secs,
            ..defaults.api
        },
        poll: PollConfig { interval_ms },
        download_dir: (!download_dir.trim().is_empty()).then(|| PathBuf::from(download_dir.trim())),
    };
    config.validate()?;

    let yaml = config.to_yaml()?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    println!("\n{}", style("SUCCESS!").bold().green());
    println!(
        "Configuration written to: {}",
        style(output.display()).cyan()
    );

    Ok(())
}
