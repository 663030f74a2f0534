//! Executions API.

use std::collections::BTreeMap;

use reqwest::Method;
use serde_json::{Map, Value};
use tracing::info;

use crate::client::AzkabanClient;
use crate::error::{Error, Result};
use crate::params::Params;
use crate::types::{ExecuteResponse, Executions, Running};

/// What to do when the flow is already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrentOption {
    /// Run regardless of existing executions.
    Ignore,
    /// Pipeline behind the running execution at the given level (1 or 2).
    Pipeline(u8),
    /// Do not run if an execution is in progress.
    Skip,
}

/// What the executor does once a job fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Let running jobs finish, start nothing new.
    FinishCurrent,
    /// Kill everything immediately.
    CancelImmediately,
    /// Keep running whatever does not depend on the failure.
    FinishPossible,
}

impl FailureAction {
    fn as_str(&self) -> &'static str {
        match self {
            FailureAction::FinishCurrent => "finishCurrent",
            FailureAction::CancelImmediately => "cancelImmediately",
            FailureAction::FinishPossible => "finishPossible",
        }
    }
}

/// Optional settings for triggering a flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Behaviour when the flow is already running.
    pub concurrent: Option<ConcurrentOption>,
    /// Behaviour on job failure.
    pub failure_action: Option<FailureAction>,
    /// Addresses notified on success.
    pub success_emails: Vec<String>,
    /// Addresses notified on failure.
    pub failure_emails: Vec<String>,
    /// Notify on the first failure rather than when the flow finishes.
    pub notify_failure_first: Option<bool>,
    /// Job IDs to skip.
    pub disabled: Vec<String>,
    /// Flow parameter overrides.
    pub overrides: BTreeMap<String, String>,
}

impl ExecuteOptions {
    /// Set the concurrency behaviour.
    pub fn concurrent(mut self, option: ConcurrentOption) -> Self {
        self.concurrent = Some(option);
        self
    }

    /// Set the failure behaviour.
    pub fn failure_action(mut self, action: FailureAction) -> Self {
        self.failure_action = Some(action);
        self
    }

    /// Add a flow parameter override.
    pub fn override_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Skip a job.
    pub fn disable(mut self, job: impl Into<String>) -> Self {
        self.disabled.push(job.into());
        self
    }

    /// Notify an address on success.
    pub fn success_email(mut self, address: impl Into<String>) -> Self {
        self.success_emails.push(address.into());
        self
    }

    /// Notify an address on failure.
    pub fn failure_email(mut self, address: impl Into<String>) -> Self {
        self.failure_emails.push(address.into());
        self
    }

    /// Append these options after the fixed parameters.
    pub(crate) fn append_to(&self, params: &mut Params) -> Result<()> {
        match self.concurrent {
            Some(ConcurrentOption::Ignore) => params.push("concurrentOption", "ignore"),
            Some(ConcurrentOption::Pipeline(level)) => {
                params.push("concurrentOption", "pipeline");
                params.push("pipelineLevel", level.to_string());
            }
            Some(ConcurrentOption::Skip) => params.push("concurrentOption", "skip"),
            None => {}
        }
        if let Some(action) = self.failure_action {
            params.push("failureAction", action.as_str());
        }
        if !self.success_emails.is_empty() {
            params.push("successEmailsOverride", "true");
            params.push("successEmails", self.success_emails.join(","));
        }
        if !self.failure_emails.is_empty() {
            params.push("failureEmailsOverride", "true");
            params.push("failureEmails", self.failure_emails.join(","));
        }
        if let Some(first) = self.notify_failure_first {
            params.push("notifyFailureFirst", first.to_string());
        }
        if !self.disabled.is_empty() {
            params.push("disabled", serde_json::to_string(&self.disabled)?);
        }
        params.extend(
            self.overrides
                .iter()
                .map(|(key, value)| (format!("flowOverride[{key}]"), value.clone())),
        );
        Ok(())
    }
}

/// Executions API client.
pub struct ExecutionsApi<'a> {
    client: &'a AzkabanClient,
}

impl<'a> ExecutionsApi<'a> {
    pub(crate) fn new(client: &'a AzkabanClient) -> Self {
        Self { client }
    }

    /// List executions of a flow, newest submission first.
    ///
    /// `start` and `length` page through the history.
    pub async fn list(
        &self,
        project: &str,
        flow: &str,
        start: usize,
        length: usize,
    ) -> Result<Executions> {
        self.client.projects().get(project).await?;

        let params = self
            .client
            .session_params()
            .add("ajax", "fetchFlowExecutions")
            .add("project", project)
            .add("flow", flow)
            .add("start", start.to_string())
            .add("length", length.to_string());

        self.client.call(Method::GET, "/manager", &params).await
    }

    /// List the executions of a flow that are currently running.
    pub async fn running(&self, project: &str, flow: &str) -> Result<Running> {
        self.client.projects().get(project).await?;

        let params = self
            .client
            .session_params()
            .add("ajax", "getRunning")
            .add("project", project)
            .add("flow", flow);

        self.client.call(Method::GET, "/executor", &params).await
    }

    /// Trigger a flow with server defaults.
    pub async fn execute(&self, project: &str, flow: &str) -> Result<ExecuteResponse> {
        self.execute_with(project, flow, &ExecuteOptions::default())
            .await
    }

    /// Trigger a flow.
    pub async fn execute_with(
        &self,
        project: &str,
        flow: &str,
        options: &ExecuteOptions,
    ) -> Result<ExecuteResponse> {
        self.client.projects().get(project).await?;

        let mut params = self
            .client
            .session_params()
            .add("ajax", "executeFlow")
            .add("project", project)
            .add("flow", flow);
        options.append_to(&mut params)?;

        let response: ExecuteResponse = self.client.call(Method::GET, "/executor", &params).await?;
        info!(project, flow, exec_id = response.exec_id, "Triggered flow");
        Ok(response)
    }

    /// Cancel a running flow.
    ///
    /// The server answers an empty object on success; any `error` key in the
    /// answer is a failure, even an empty one.
    pub async fn cancel(&self, project: &str, flow: &str) -> Result<()> {
        self.client.projects().get(project).await?;

        let params = self
            .client
            .session_params()
            .add("ajax", "cancelFlow")
            .add("project", project)
            .add("flow", flow);

        let response: Map<String, Value> =
            self.client.call(Method::GET, "/executor", &params).await?;

        match response.get("error") {
            Some(Value::String(message)) => Err(Error::Service(message.clone())),
            Some(other) => Err(Error::Service(other.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_add_nothing() {
        let mut params = Params::new().add("ajax", "executeFlow");
        ExecuteOptions::default().append_to(&mut params).unwrap();
        assert_eq!(params, Params::new().add("ajax", "executeFlow"));
    }

    #[test]
    fn test_options_follow_fixed_params() {
        let mut params = Params::new()
            .add("ajax", "executeFlow")
            .add("project", "etl")
            .add("flow", "nightly");
        let options = ExecuteOptions::default()
            .concurrent(ConcurrentOption::Pipeline(2))
            .failure_action(FailureAction::FinishPossible)
            .override_param("project", "shadowed")
            .override_param("date", "2024-01-31")
            .disable("load")
            .failure_email("oncall@example.com")
            .failure_email("data@example.com");
        options.append_to(&mut params).unwrap();

        assert_eq!(params.get("project"), Some("etl"));
        assert_eq!(params.get("flow"), Some("nightly"));
        assert_eq!(params.get("concurrentOption"), Some("pipeline"));
        assert_eq!(params.get("pipelineLevel"), Some("2"));
        assert_eq!(params.get("failureAction"), Some("finishPossible"));
        assert_eq!(params.get("failureEmailsOverride"), Some("true"));
        assert_eq!(params.get("failureEmails"), Some("oncall@example.com,data@example.com"));
        assert_eq!(params.get("successEmails"), None);
        assert_eq!(params.get("disabled"), Some(r#"["load"]"#));
        assert_eq!(params.get("flowOverride[project]"), Some("shadowed"));
        assert_eq!(params.get("flowOverride[date]"), Some("2024-01-31"));

        let fixed: Vec<(String, String)> = [("ajax", "executeFlow"), ("project", "etl"), ("flow", "nightly")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(&params.pairs()[..3], fixed.as_slice());
    }

    #[test]
    fn test_skip_and_ignore() {
        let mut params = Params::new();
        ExecuteOptions::default()
            .concurrent(ConcurrentOption::Skip)
            .append_to(&mut params)
            .unwrap();
        assert_eq!(params.get("concurrentOption"), Some("skip"));
        assert_eq!(params.get("pipelineLevel"), None);

        let mut params = Params::new();
        ExecuteOptions {
            concurrent: Some(ConcurrentOption::Ignore),
            notify_failure_first: Some(true),
            ..Default::default()
        }
        .append_to(&mut params)
        .unwrap();
        assert_eq!(params.get("concurrentOption"), Some("ignore"));
        assert_eq!(params.get("notifyFailureFirst"), Some("true"));
    }
}
