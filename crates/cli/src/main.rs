//! Vartiq CLI
//!
//! A command-line interface for the Vartiq webhook delivery API.

mod commands;

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
use vartiq_client::{ClientConfig, DEFAULT_BASE_URL, VartiqClient};

/// Vartiq CLI — manage projects, apps and webhooks, and check signatures.
#[derive(Parser, Debug)]
#[command(name = "vartiq", version, about)]
struct Cli {
    /// Vartiq API base URL.
    #[arg(long, env = "VARTIQ_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// API key for authentication.
    #[arg(long, env = "VARTIQ_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "VARTIQ_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage projects.
    Projects(commands::projects::ProjectsArgs),
    /// Manage apps.
    Apps(commands::apps::AppsArgs),
    /// Manage webhooks.
    Webhooks(commands::webhooks::WebhooksArgs),
    /// Send webhook messages.
    Messages(commands::messages::MessagesArgs),
    /// Compute the signature of a payload.
    Sign(commands::signature::SignArgs),
    /// Verify the signature of a received payload.
    Verify(commands::signature::VerifyArgs),
}

impl Cli {
    fn client(&self) -> anyhow::Result<VartiqClient> {
        let api_key = self
            .api_key
            .as_deref()
            .context("an API key is required (pass --api-key or set VARTIQ_API_KEY)")?;

        let mut config = ClientConfig::new(api_key).with_base_url(&self.base_url);
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(VartiqClient::from_config(&config)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Sign(args) => commands::signature::sign(args),
        Command::Verify(args) => commands::signature::verify(args),
        Command::Projects(args) => commands::projects::run(&cli.client()?, args, &cli.format).await,
        Command::Apps(args) => commands::apps::run(&cli.client()?, args, &cli.format).await,
        Command::Webhooks(args) => commands::webhooks::run(&cli.client()?, args, &cli.format).await,
        Command::Messages(args) => commands::messages::run(&cli.client()?, args, &cli.format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn api_commands_require_a_key() {
        let mut cli = Cli::try_parse_from(["vartiq", "projects", "list"]).unwrap();
        cli.api_key = None;
        let err = cli.client().unwrap_err();
        assert!(err.to_string().contains("API key"), "{err}");
    }

    #[test]
    fn global_flags_build_client() {
        let cli = Cli::try_parse_from([
            "vartiq",
            "apps",
            "list",
            "--project-id",
            "p1",
            "--api-key",
            "k",
            "--base-url",
            "http://localhost:3000/",
        ])
        .unwrap();
        let client = cli.client().unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }
}
