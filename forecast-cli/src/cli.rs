use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, ProviderId,
    provider::{default_provider_from_config, provider_from_config},
    search,
};
use inquire::{Password, PasswordDisplayMode};

use crate::render::{DEFAULT_DISPLAY_DAYS, render_report};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Current weather and a daily forecast for any city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a provider.
    Configure {
        /// Provider short name, e.g. "openweather".
        provider: String,
    },

    /// Make a provider the default for `show`.
    Default {
        /// Provider short name, e.g. "openweather" or "openmeteo".
        provider: String,
    },

    /// Show current conditions and the daily forecast for a city.
    Show {
        /// City name; the configured default city when absent.
        city: Option<String>,

        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Number of forecast days to display.
        #[arg(long, default_value_t = DEFAULT_DISPLAY_DAYS)]
        days: usize,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Default { provider } => set_default(&provider),
            Command::Show { city, provider, days } => show(city, provider, days).await,
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    if !id.requires_api_key() {
        println!("Provider '{id}' needs no API key.");
        return Ok(());
    }

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let mut config = Config::load()?;
    config.upsert_provider_api_key(id, api_key.trim().to_string());
    let path = config.save()?;

    tracing::info!(provider = %id, path = %path.display(), "saved provider API key");
    println!("Saved API key for '{id}' to {}", path.display());
    Ok(())
}

fn set_default(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if !config.is_provider_configured(id) {
        anyhow::bail!(
            "Provider '{id}' has no API key yet.\n\
             Hint: run `forecast configure {id}` first."
        );
    }

    config.set_default_provider(id);
    config.save()?;
    println!("Default provider is now '{id}'.");
    Ok(())
}

async fn show(city: Option<String>, provider: Option<String>, days: usize) -> anyhow::Result<()> {
    let config = Config::load()?;

    let provider = match provider.as_deref() {
        Some(name) => provider_from_config(ProviderId::try_from(name)?, &config)?,
        None => default_provider_from_config(&config)?,
    };

    let query = city.unwrap_or_else(|| config.default_city().to_string());
    let report = search(provider.as_ref(), &query).await?;

    print!("{}", render_report(&report, days, Utc::now()));
    Ok(())
}
