//! Response types for the Azkaban web server API.
//!
//! Every field defaults when absent: the server omits fields freely and
//! sometimes answers with all-empty structures that are still valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::decode::Destination;

/// Status tag the server uses for success.
pub const STATUS_SUCCESS: &str = "success";

/// Status tag the server uses for failure.
pub const STATUS_ERROR: &str = "error";

// ─────────────────────────────────────────────────────────────────────────────
// Status envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Generic status envelope carried by most endpoints.
///
/// Also the decoded result of the schedule endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusDetail {
    /// Error message, set on failure by most endpoints.
    pub error: Option<String>,
    /// `success` or `error`.
    pub status: Option<String>,
    /// Human readable message; carries the failure text when `status` is `error`.
    pub message: Option<String>,
}

impl StatusDetail {
    /// The failure text this envelope signals, if any.
    ///
    /// A non-empty `error` wins; otherwise `status == "error"` yields `message`.
    pub fn service_error(&self) -> Option<String> {
        if let Some(error) = self.error.as_deref()
            && !error.is_empty()
        {
            return Some(error.to_string());
        }
        if self.status.as_deref() == Some(STATUS_ERROR) {
            return Some(self.message.clone().unwrap_or_default());
        }
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

/// Project identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Numeric project ID.
    #[serde(rename = "projectId")]
    pub id: i64,
    /// Project name.
    #[serde(rename = "project")]
    pub name: String,
}

/// Which project mutation a [`ProjectAction`] reports on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectActionKind {
    #[default]
    Create,
    Delete,
}

/// Outcome of creating or deleting a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectAction {
    /// Project name.
    pub project: String,
    /// Mutation performed.
    #[serde(skip)]
    pub action: ProjectActionKind,
    /// `success` or `error`.
    pub status: String,
}

impl ProjectAction {
    /// Whether the server reported success.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Flows and jobs
// ─────────────────────────────────────────────────────────────────────────────

/// A flow within a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flow {
    /// Flow ID.
    #[serde(rename = "flowId")]
    pub id: String,
}

/// Response for fetching the flows of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flows {
    /// Owning project.
    #[serde(flatten)]
    pub project: Project,
    /// Flows in the project.
    pub flows: Vec<Flow>,
}

/// A job node in a flow graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    /// Job ID.
    pub id: String,
    /// Job type (`command`, `flow`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// IDs of the jobs this one depends on.
    #[serde(rename = "in")]
    pub dependencies: Vec<String>,
}

/// Response for fetching a flow graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Jobs {
    /// Owning project.
    #[serde(flatten)]
    pub project: Project,
    /// Flow ID.
    pub flow: String,
    /// Job nodes and their dependency edges.
    pub nodes: Vec<Node>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Executions
// ─────────────────────────────────────────────────────────────────────────────

/// A single flow execution.
///
/// The server reports times as epoch milliseconds; the calendar fields are
/// derived from them while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExecutionRecord", into = "ExecutionRecord")]
pub struct Execution {
    /// Execution ID.
    pub exec_id: i64,
    /// Project ID.
    pub project_id: i64,
    /// Flow ID.
    pub flow_id: String,
    /// User who submitted the execution.
    pub submit_user: String,
    /// Submission time, epoch milliseconds.
    pub submit_time: i64,
    /// Start time, epoch milliseconds (`-1` when not started).
    pub start_time: i64,
    /// End time, epoch milliseconds (`-1` when not finished).
    pub end_time: i64,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time.
    pub finished_at: DateTime<Utc>,
    /// Execution status (`RUNNING`, `SUCCEEDED`, `FAILED`, ...).
    pub status: String,
}

/// Wire form of [`Execution`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExecutionRecord {
    exec_id: i64,
    project_id: i64,
    flow_id: String,
    submit_user: String,
    submit_time: i64,
    start_time: i64,
    end_time: i64,
    status: String,
}

/// Convert epoch milliseconds to a calendar time, truncated to the second.
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(millis / 1000, 0)
}

impl TryFrom<ExecutionRecord> for Execution {
    type Error = String;

    fn try_from(record: ExecutionRecord) -> Result<Self, Self::Error> {
        let convert = |field: &str, millis: i64| {
            millis_to_datetime(millis)
                .ok_or_else(|| format!("{field} out of range: {millis}"))
        };
        Ok(Self {
            submitted_at: convert("submitTime", record.submit_time)?,
            started_at: convert("startTime", record.start_time)?,
            finished_at: convert("endTime", record.end_time)?,
            exec_id: record.exec_id,
            project_id: record.project_id,
            flow_id: record.flow_id,
            submit_user: record.submit_user,
            submit_time: record.submit_time,
            start_time: record.start_time,
            end_time: record.end_time,
            status: record.status,
        })
    }
}

impl From<Execution> for ExecutionRecord {
    fn from(execution: Execution) -> Self {
        Self {
            exec_id: execution.exec_id,
            project_id: execution.project_id,
            flow_id: execution.flow_id,
            submit_user: execution.submit_user,
            submit_time: execution.submit_time,
            start_time: execution.start_time,
            end_time: execution.end_time,
            status: execution.status,
        }
    }
}

/// A page of executions of a flow, newest submission first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Executions {
    /// Executions in this page.
    pub executions: Vec<Execution>,
    /// Project name.
    pub project: String,
    /// Project ID.
    #[serde(rename = "projectId")]
    pub project_id: i64,
    /// Flow ID.
    pub flow: String,
    /// Index of the first execution in this page.
    #[serde(rename = "from")]
    pub start: i64,
    /// Page size requested.
    pub length: i64,
    /// Total executions of the flow.
    pub total: i64,
}

/// Currently running executions of a flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Running {
    /// Execution IDs.
    #[serde(rename = "execIds", deserialize_with = "ids_as_strings")]
    pub exec_ids: Vec<String>,
}

/// Accept execution IDs as either JSON numbers or strings.
fn ids_as_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    let ids = Vec::<Id>::deserialize(deserializer)?;
    Ok(ids
        .into_iter()
        .map(|id| match id {
            Id::Number(n) => n.to_string(),
            Id::Text(s) => s,
        })
        .collect())
}

/// Response for triggering a flow execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecuteResponse {
    /// ID of the new execution.
    #[serde(rename = "execid")]
    pub exec_id: i64,
    /// Server message.
    pub message: String,
    /// Project name.
    pub project: String,
    /// Flow ID.
    pub flow: String,
}

impl Destination for StatusDetail {}
impl Destination for Project {}
impl Destination for ProjectAction {}
impl Destination for Flows {}
impl Destination for Jobs {}
impl Destination for Executions {}
impl Destination for Running {}
impl Destination for ExecuteResponse {}
