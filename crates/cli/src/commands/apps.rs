use clap::{Args, Subcommand};
use vartiq_client::{App, CreateAppRequest, UpdateAppRequest, VartiqClient};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AppsCommand {
    /// Create an app in a project.
    Create {
        /// App name.
        #[arg(long)]
        name: String,
        /// Project the app belongs to.
        #[arg(long)]
        project_id: String,
        /// App description.
        #[arg(long)]
        description: Option<String>,
    },
    /// List the apps of a project.
    List {
        /// Project ID.
        #[arg(long)]
        project_id: String,
    },
    /// Get an app by ID.
    Get {
        /// App ID.
        id: String,
    },
    /// Update an app.
    Update {
        /// App ID.
        id: String,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an app.
    Delete {
        /// App ID.
        id: String,
    },
}

fn print_app(app: &App, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(app)?),
        OutputFormat::Text => {
            println!("ID:          {}", app.id);
            println!("Name:        {}", app.name);
            println!("Description: {}", app.description);
            println!("Created:     {}", app.created_at);
        }
    }
    Ok(())
}

pub async fn run(client: &VartiqClient, args: &AppsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let apps = client.apps();
    match &args.command {
        AppsCommand::Create {
            name,
            project_id,
            description,
        } => {
            let mut request = CreateAppRequest::new(name, project_id);
            request.description.clone_from(description);
            let resp = apps.create(&request).await?;
            print_app(&resp.data, format)?;
        }
        AppsCommand::List { project_id } => {
            let resp = apps.list(project_id).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resp.data)?),
                OutputFormat::Text => {
                    println!("{} apps in project {project_id}:", resp.data.len());
                    for a in &resp.data {
                        println!("  {} | {}", a.id, a.name);
                    }
                }
            }
        }
        AppsCommand::Get { id } => {
            let resp = apps.get(id).await?;
            print_app(&resp.data, format)?;
        }
        AppsCommand::Update {
            id,
            name,
            description,
        } => {
            let update = UpdateAppRequest {
                name: name.clone(),
                description: description.clone(),
            };
            let resp = apps.update(id, &update).await?;
            print_app(&resp.data, format)?;
        }
        AppsCommand::Delete { id } => {
            apps.delete(id).await?;
            println!("App '{id}' deleted.");
        }
    }
    Ok(())
}
