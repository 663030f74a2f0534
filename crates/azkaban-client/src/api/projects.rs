//! Projects API.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::client::{AzkabanClient, SESSION_PARAM};
use crate::error::{Error, Result};
use crate::package::{package_job, JobFile};
use crate::types::{Project, ProjectAction, ProjectActionKind, STATUS_ERROR, STATUS_SUCCESS};

/// Projects API client.
pub struct ProjectsApi<'a> {
    client: &'a AzkabanClient,
}

impl<'a> ProjectsApi<'a> {
    pub(crate) fn new(client: &'a AzkabanClient) -> Self {
        Self { client }
    }

    /// Look up a project by name.
    ///
    /// Existence is probed through the project's flow list; an unknown
    /// project yields [`Error::ProjectNotFound`].
    pub async fn get(&self, name: &str) -> Result<Project> {
        let flows = self.client.flows().list(name).await?;
        Ok(flows.project)
    }

    /// Create a project.
    pub async fn create(&self, name: &str, description: &str) -> Result<ProjectAction> {
        let params = self
            .client
            .session_params()
            .add("action", "create")
            .add("name", name)
            .add("description", description);

        let mut action: ProjectAction = self.client.call(Method::POST, "/manager", &params).await?;
        if action.project.is_empty() {
            action.project = name.to_string();
        }
        action.action = ProjectActionKind::Create;

        info!(project = name, status = %action.status, "Created project");
        Ok(action)
    }

    /// Delete a project.
    ///
    /// The delete endpoint has no structured answer, so success is judged by
    /// looking the project up again afterwards. A project that is still
    /// found comes back with `status == "error"` and no `Err`. Only a
    /// transport failure of the delete request itself is returned as one.
    pub async fn delete(&self, name: &str) -> Result<ProjectAction> {
        let mut action = ProjectAction {
            project: name.to_string(),
            action: ProjectActionKind::Delete,
            status: STATUS_ERROR.to_string(),
        };

        self.get(name).await?;

        let params = self
            .client
            .session_params()
            .add("delete", "true")
            .add("project", name);

        // Only an exchange that never reached the server is fatal here;
        // whatever the endpoint answered, the lookup below decides.
        match self.client.call::<String>(Method::GET, "/manager", &params).await {
            Err(err @ Error::Http(_)) => return Err(err),
            Err(err) => debug!(project = name, error = %err, "Ignoring delete answer"),
            Ok(_) => {}
        }

        match self.get(name).await {
            Err(Error::ProjectNotFound(_)) => {
                action.status = STATUS_SUCCESS.to_string();
                info!(project = name, "Deleted project");
            }
            Ok(_) => warn!(project = name, "Project still present after delete"),
            Err(err) => return Err(err),
        }

        Ok(action)
    }

    /// Upload a zip archive of job definitions into a project.
    ///
    /// Only the HTTP status of the answer is checked.
    pub async fn upload_zip(&self, project: &str, archive: impl AsRef<Path>) -> Result<()> {
        let archive = archive.as_ref();
        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Config(format!("not a file path: {}", archive.display())))?;

        let content = tokio::fs::read(archive).await?;
        let bytes = content.len();

        let file = Part::bytes(content)
            .file_name(file_name)
            .mime_str("application/zip")?;
        let form = Form::new()
            .part("file", file)
            .text("ajax", "upload")
            .text("project", project.to_string())
            .text(SESSION_PARAM, self.client.session_id().unwrap_or_default().to_string());

        self.client.send_multipart("/manager", form).await?;

        info!(project, archive = %archive.display(), bytes, "Uploaded project archive");
        Ok(())
    }

    /// Package shell commands as a single command job and upload it.
    ///
    /// The job file and archive live in a temporary directory removed on
    /// return, whether or not the upload succeeded.
    pub async fn create_command_job<S: AsRef<str>>(
        &self,
        project: &str,
        job: &str,
        commands: &[S],
    ) -> Result<()> {
        let job_file = JobFile::new(job, commands.iter().map(|c| c.as_ref().to_string()));

        let (_workdir, archive) = tokio::task::spawn_blocking(move || package_job(&job_file))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(format!("packaging task failed: {e}"))))??;

        self.upload_zip(project, &archive).await
    }
}
