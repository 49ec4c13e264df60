use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{Envelope, Error, VartiqClient, resource_path};

/// A project groups apps belonging to one product or team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Owning company ID.
    #[serde(default)]
    pub company: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: String,
}

/// Request body for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
}

impl CreateProjectRequest {
    /// Create a request with the given name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Partial update for a project. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Project operations, obtained from [`VartiqClient::projects`].
#[derive(Debug, Clone, Copy)]
pub struct Projects<'a> {
    client: &'a VartiqClient,
}

impl<'a> Projects<'a> {
    pub(crate) fn new(client: &'a VartiqClient) -> Self {
        Self { client }
    }

    /// Create a project.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), vartiq_client::Error> {
    /// use vartiq_client::{CreateProjectRequest, VartiqClient};
    ///
    /// let client = VartiqClient::new("your-api-key")?;
    /// let project = client
    ///     .projects()
    ///     .create(&CreateProjectRequest::new("Billing", "Invoice events"))
    ///     .await?;
    /// println!("Created {}", project.data.id);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(method = "POST", path = "/projects"))]
    pub async fn create(&self, request: &CreateProjectRequest) -> Result<Envelope<Project>, Error> {
        let req = self.client.request(Method::POST, "/projects").json(request);
        self.client.send(req).await
    }

    /// List all projects visible to the API key.
    #[instrument(skip_all, fields(method = "GET", path = "/projects"))]
    pub async fn list(&self) -> Result<Envelope<Vec<Project>>, Error> {
        let req = self.client.request(Method::GET, "/projects");
        self.client.send(req).await
    }

    /// Get a project by ID.
    #[instrument(skip(self), fields(method = "GET"))]
    pub async fn get(&self, project_id: &str) -> Result<Envelope<Project>, Error> {
        let req = self
            .client
            .request(Method::GET, &resource_path("projects", project_id));
        self.client.send(req).await
    }

    /// Update a project by ID.
    #[instrument(skip(self, request), fields(method = "PUT"))]
    pub async fn update(
        &self,
        project_id: &str,
        request: &UpdateProjectRequest,
    ) -> Result<Envelope<Project>, Error> {
        let req = self
            .client
            .request(Method::PUT, &resource_path("projects", project_id))
            .json(request);
        self.client.send(req).await
    }

    /// Delete a project by ID.
    #[instrument(skip(self), fields(method = "DELETE"))]
    pub async fn delete(&self, project_id: &str) -> Result<(), Error> {
        let req = self
            .client
            .request(Method::DELETE, &resource_path("projects", project_id));
        self.client.send_unit(req).await
    }
}
