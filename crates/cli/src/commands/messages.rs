use clap::{Args, Subcommand};
use vartiq_client::VartiqClient;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct MessagesArgs {
    #[command(subcommand)]
    pub command: MessagesCommand,
}

#[derive(Subcommand, Debug)]
pub enum MessagesCommand {
    /// Send a message to every webhook of an app.
    Send {
        /// Target app ID.
        #[arg(long)]
        app_id: String,
        /// JSON payload (string or @file path).
        #[arg(long)]
        payload: String,
    },
}

fn read_payload(arg: &str) -> anyhow::Result<serde_json::Value> {
    let payload = match arg.strip_prefix('@') {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => serde_json::from_str(arg)?,
    };
    Ok(payload)
}

pub async fn run(
    client: &VartiqClient,
    args: &MessagesArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        MessagesCommand::Send { app_id, payload } => {
            let payload = read_payload(payload)?;
            let resp = client.webhook_messages().create(app_id, &payload).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resp.data)?),
                OutputFormat::Text => {
                    println!("Message:   {}", resp.data.id);
                    println!("App:       {}", resp.data.app_id);
                    println!("Delivered: {}", resp.data.is_delivered);
                    if !resp.data.signature.is_empty() {
                        println!("Signature: {}", resp.data.signature);
                    }
                }
            }
        }
    }
    Ok(())
}
