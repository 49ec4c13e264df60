use clap::{Args, Subcommand};
use vartiq_client::{CreateWebhookRequest, Header, UpdateWebhookRequest, VartiqClient, Webhook};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct WebhooksArgs {
    #[command(subcommand)]
    pub command: WebhooksCommand,
}

/// Delivery authentication options.
#[derive(Args, Debug, Default)]
pub struct AuthArgs {
    /// Auth method: basic, hmac or apiKey.
    #[arg(long)]
    pub auth_method: Option<String>,
    /// Basic auth user name.
    #[arg(long)]
    pub user_name: Option<String>,
    /// Basic auth password.
    #[arg(long)]
    pub password: Option<String>,
    /// API key sent to the endpoint (apiKey auth).
    #[arg(long = "webhook-api-key")]
    pub webhook_api_key: Option<String>,
    /// Header carrying the API key (apiKey auth).
    #[arg(long)]
    pub api_key_header: Option<String>,
    /// Header carrying the signature (hmac auth).
    #[arg(long)]
    pub hmac_header: Option<String>,
    /// Signing secret (hmac auth).
    #[arg(long)]
    pub hmac_secret: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum WebhooksCommand {
    /// Register a webhook on an app.
    Create {
        /// Delivery URL.
        #[arg(long)]
        url: String,
        /// App the webhook belongs to.
        #[arg(long)]
        app_id: String,
        /// Custom delivery headers (key=value).
        #[arg(long = "header", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// List the webhooks of an app.
    List {
        /// App ID.
        #[arg(long)]
        app_id: String,
    },
    /// Get a webhook by ID.
    Get {
        /// Webhook ID.
        id: String,
    },
    /// Update a webhook.
    Update {
        /// Webhook ID.
        id: String,
        /// New delivery URL.
        #[arg(long)]
        url: Option<String>,
        /// Replacement custom headers (key=value).
        #[arg(long = "header", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Delete a webhook.
    Delete {
        /// Webhook ID.
        id: String,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    Ok((key.to_string(), value.to_string()))
}

fn to_headers(pairs: &[(String, String)]) -> Vec<Header> {
    pairs.iter().map(|(k, v)| Header::new(k, v)).collect()
}

fn create_request(
    url: &str,
    app_id: &str,
    headers: &[(String, String)],
    auth: &AuthArgs,
) -> CreateWebhookRequest {
    CreateWebhookRequest {
        custom_headers: to_headers(headers),
        auth_method: auth.auth_method.clone(),
        user_name: auth.user_name.clone(),
        password: auth.password.clone(),
        api_key: auth.webhook_api_key.clone(),
        api_key_header: auth.api_key_header.clone(),
        hmac_header: auth.hmac_header.clone(),
        hmac_secret: auth.hmac_secret.clone(),
        ..CreateWebhookRequest::new(url, app_id)
    }
}

fn update_request(url: Option<&String>, headers: &[(String, String)], auth: &AuthArgs) -> UpdateWebhookRequest {
    UpdateWebhookRequest {
        url: url.cloned(),
        custom_headers: (!headers.is_empty()).then(|| to_headers(headers)),
        auth_method: auth.auth_method.clone(),
        user_name: auth.user_name.clone(),
        password: auth.password.clone(),
        api_key: auth.webhook_api_key.clone(),
        api_key_header: auth.api_key_header.clone(),
        hmac_header: auth.hmac_header.clone(),
        hmac_secret: auth.hmac_secret.clone(),
    }
}

fn print_webhook(webhook: &Webhook, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(webhook)?),
        OutputFormat::Text => {
            println!("ID:      {}", webhook.id);
            println!("URL:     {}", webhook.url);
            println!("App:     {}", webhook.app_id);
            let auth = webhook
                .auth_method
                .as_ref()
                .map_or("none", |a| a.method.as_str());
            println!("Auth:    {auth}");
            if !webhook.custom_headers.is_empty() {
                println!("Headers:");
                for h in &webhook.custom_headers {
                    println!("  {}: {}", h.key, h.value);
                }
            }
            println!("Created: {}", webhook.created_at);
        }
    }
    Ok(())
}

pub async fn run(
    client: &VartiqClient,
    args: &WebhooksArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let webhooks = client.webhooks();
    match &args.command {
        WebhooksCommand::Create {
            url,
            app_id,
            headers,
            auth,
        } => {
            let resp = webhooks
                .create(&create_request(url, app_id, headers, auth))
                .await?;
            print_webhook(&resp.data, format)?;
        }
        WebhooksCommand::List { app_id } => {
            let resp = webhooks.list(app_id).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resp.data)?),
                OutputFormat::Text => {
                    println!("{} webhooks on app {app_id}:", resp.data.len());
                    for w in &resp.data {
                        let auth = w.auth_method.as_ref().map_or("none", |a| a.method.as_str());
                        println!("  {} | {} | auth: {auth}", w.id, w.url);
                    }
                }
            }
        }
        WebhooksCommand::Get { id } => {
            let resp = webhooks.get(id).await?;
            print_webhook(&resp.data, format)?;
        }
        WebhooksCommand::Update {
            id,
            url,
            headers,
            auth,
        } => {
            let resp = webhooks
                .update(id, &update_request(url.as_ref(), headers, auth))
                .await?;
            print_webhook(&resp.data, format)?;
        }
        WebhooksCommand::Delete { id } => {
            webhooks.delete(id).await?;
            println!("Webhook '{id}' deleted.");
        }
    }
    Ok(())
}
