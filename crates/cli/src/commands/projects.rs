use clap::{Args, Subcommand};
use vartiq_client::{CreateProjectRequest, Project, UpdateProjectRequest, VartiqClient};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// Create a project.
    Create {
        /// Project name.
        #[arg(long)]
        name: String,
        /// Project description.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List projects.
    List,
    /// Get a project by ID.
    Get {
        /// Project ID.
        id: String,
    },
    /// Update a project.
    Update {
        /// Project ID.
        id: String,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a project.
    Delete {
        /// Project ID.
        id: String,
    },
}

fn print_project(project: &Project, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(project)?),
        OutputFormat::Text => {
            println!("ID:          {}", project.id);
            println!("Name:        {}", project.name);
            println!("Description: {}", project.description);
            println!("Created:     {}", project.created_at);
            println!("Updated:     {}", project.updated_at);
        }
    }
    Ok(())
}

pub async fn run(
    client: &VartiqClient,
    args: &ProjectsArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let projects = client.projects();
    match &args.command {
        ProjectsCommand::Create { name, description } => {
            let resp = projects
                .create(&CreateProjectRequest::new(name, description))
                .await?;
            print_project(&resp.data, format)?;
        }
        ProjectsCommand::List => {
            let resp = projects.list().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resp.data)?),
                OutputFormat::Text => {
                    println!("{} projects:", resp.data.len());
                    for p in &resp.data {
                        println!("  {} | {}", p.id, p.name);
                    }
                }
            }
        }
        ProjectsCommand::Get { id } => {
            let resp = projects.get(id).await?;
            print_project(&resp.data, format)?;
        }
        ProjectsCommand::Update {
            id,
            name,
            description,
        } => {
            let update = UpdateProjectRequest {
                name: name.clone(),
                description: description.clone(),
            };
            let resp = projects.update(id, &update).await?;
            print_project(&resp.data, format)?;
        }
        ProjectsCommand::Delete { id } => {
            projects.delete(id).await?;
            println!("Project '{id}' deleted.");
        }
    }
    Ok(())
}
