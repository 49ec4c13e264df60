use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{Envelope, Error, VartiqClient, resource_path};

/// An app is the unit webhooks and messages are attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    /// App ID.
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

/// Request body for creating an app inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppRequest {
    /// Display name.
    pub name: String,
    /// Project the app belongs to.
    pub project_id: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateAppRequest {
    /// Create a request for an app named `name` in `project_id`.
    pub fn new(name: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_id: project_id.into(),
            description: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update for an app. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAppRequest {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// App operations, obtained from [`VartiqClient::apps`].
#[derive(Debug, Clone, Copy)]
pub struct Apps<'a> {
    client: &'a VartiqClient,
}

impl<'a> Apps<'a> {
    pub(crate) fn new(client: &'a VartiqClient) -> Self {
        Self { client }
    }

    /// Create an app.
    #[instrument(skip_all, fields(method = "POST", path = "/apps", project_id = %request.project_id))]
    pub async fn create(&self, request: &CreateAppRequest) -> Result<Envelope<App>, Error> {
        let req = self.client.request(Method::POST, "/apps").json(request);
        self.client.send(req).await
    }

    /// List the apps of a project.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), vartiq_client::Error> {
    /// use vartiq_client::VartiqClient;
    ///
    /// let client = VartiqClient::new("your-api-key")?;
    /// for app in client.apps().list("project-id").await?.data {
    ///     println!("{}: {}", app.id, app.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(method = "GET", path = "/apps"))]
    pub async fn list(&self, project_id: &str) -> Result<Envelope<Vec<App>>, Error> {
        let req = self
            .client
            .request(Method::GET, "/apps")
            .query(&[("projectId", project_id)]);
        self.client.send(req).await
    }

    /// Get an app by ID.
    #[instrument(skip(self), fields(method = "GET"))]
    pub async fn get(&self, app_id: &str) -> Result<Envelope<App>, Error> {
        let req = self
            .client
            .request(Method::GET, &resource_path("apps", app_id));
        self.client.send(req).await
    }

    /// Update an app by ID.
    #[instrument(skip(self, request), fields(method = "PUT"))]
    pub async fn update(
        &self,
        app_id: &str,
        request: &UpdateAppRequest,
    ) -> Result<Envelope<App>, Error> {
        let req = self
            .client
            .request(Method::PUT, &resource_path("apps", app_id))
            .json(request);
        self.client.send(req).await
    }

    /// Delete an app by ID.
    #[instrument(skip(self), fields(method = "DELETE"))]
    pub async fn delete(&self, app_id: &str) -> Result<(), Error> {
        let req = self
            .client
            .request(Method::DELETE, &resource_path("apps", app_id));
        self.client.send_unit(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockServer, ok_envelope};

    fn app_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": "Checkout",
            "description": "",
            "company": "c-1",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-02T10:00:00Z"
        })
    }

    #[test]
    fn create_request_serializes_camel_case() {
        let req = CreateAppRequest::new("Checkout", "p1");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"name": "Checkout", "projectId": "p1"})
        );

        let req = req.with_description("Orders");
        assert_eq!(serde_json::to_value(&req).unwrap()["description"], "Orders");
    }

    #[tokio::test]
    async fn list_filters_by_project() {
        let server = MockServer::start().await;
        let client = server.client();
        let body = ok_envelope(&serde_json::json!([app_json("a1")]));
        let handle = tokio::spawn(async move { server.respond_once(200, &body).await });

        let env = client.apps().list("p1").await.unwrap();
        let request = handle.await.unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.target, "/apps?projectId=p1");
        assert_eq!(env.data.len(), 1);
        assert_eq!(env.data[0].updated_at, "2024-05-02T10:00:00Z");
    }

    #[tokio::test]
    async fn create_posts_project_id() {
        let server = MockServer::start().await;
        let client = server.client();
        let body = ok_envelope(&app_json("a1"));
        let handle = tokio::spawn(async move { server.respond_once(201, &body).await });

        let env = client
            .apps()
            .create(&CreateAppRequest::new("Checkout", "p1"))
            .await
            .unwrap();
        let request = handle.await.unwrap();

        assert_eq!(request.target, "/apps");
        assert_eq!(request.json()["projectId"], "p1");
        assert_eq!(env.data.id, "a1");
    }

    #[tokio::test]
    async fn update_and_delete_use_id_path() {
        let server = MockServer::start().await;
        let client = server.client();
        let body = ok_envelope(&app_json("a1"));
        let handle = tokio::spawn(async move { server.respond_once(200, &body).await });

        let update = UpdateAppRequest {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        client.apps().update("a1", &update).await.unwrap();
        let request = handle.await.unwrap();
        assert_eq!(request.method, "PUT");
        assert_eq!(request.target, "/apps/a1");
        assert_eq!(request.json(), serde_json::json!({"name": "Renamed"}));

        let server = MockServer::start().await;
        let client = server.client();
        let handle = tokio::spawn(async move {
            server
                .respond_once(200, r#"{"data":null,"message":"App deleted","success":true}"#)
                .await
        });
        client.apps().delete("a1").await.unwrap();
        let request = handle.await.unwrap();
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.target, "/apps/a1");
    }

    #[tokio::test]
    async fn delete_failure_is_reported() {
        let server = MockServer::start().await;
        let client = server.client();
        let handle = tokio::spawn(async move {
            server
                .respond_once(403, r#"{"message":"Forbidden","success":false}"#)
                .await
        });

        let err = client.apps().delete("a1").await.unwrap_err();
        handle.await.unwrap();
        assert_eq!(err.api_message(), Some("Forbidden"));
    }
}
