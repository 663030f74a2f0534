//! Flows API.

use reqwest::Method;

use crate::client::AzkabanClient;
use crate::error::{Error, Result};
use crate::types::{Flows, Jobs};

/// Flows API client.
pub struct FlowsApi<'a> {
    client: &'a AzkabanClient,
}

impl<'a> FlowsApi<'a> {
    pub(crate) fn new(client: &'a AzkabanClient) -> Self {
        Self { client }
    }

    /// List the flows of a project.
    ///
    /// The server answers an unknown project with an empty body, which is
    /// reported as [`Error::ProjectNotFound`].
    pub async fn list(&self, project: &str) -> Result<Flows> {
        let params = self
            .client
            .session_params()
            .add("ajax", "fetchprojectflows")
            .add("project", project);

        match self.client.call(Method::GET, "/manager", &params).await {
            Err(Error::EmptyResponse) => Err(Error::ProjectNotFound(project.to_string())),
            other => other,
        }
    }

    /// Fetch the job graph of a flow.
    pub async fn jobs(&self, project: &str, flow: &str) -> Result<Jobs> {
        self.client.projects().get(project).await?;

        let params = self
            .client
            .session_params()
            .add("ajax", "fetchflowgraph")
            .add("project", project)
            .add("flow", flow);

        self.client.call(Method::GET, "/manager", &params).await
    }
}
