//! HTTP client for the Azkaban workflow scheduler's management API.
//!
//! Wraps the web server's ajax endpoints: login, project management, job
//! archive upload, flow graphs, and triggering, listing and cancelling
//! executions.
//!
//! # Example
//!
//! ```no_run
//! use azkaban_client::{AzkabanClient, ConcurrentOption, ExecuteOptions, Result};
//!
//! # async fn example() -> Result<()> {
//! let mut client = AzkabanClient::new("https://azkaban.internal:8443")?;
//! client.authenticate("etl", "secret").await?;
//!
//! // Ship a one-job project
//! client.projects().create("warehouse", "Nightly warehouse load").await?;
//! client
//!     .projects()
//!     .create_command_job("warehouse", "load", &["./load.sh --full"])
//!     .await?;
//!
//! // Run it
//! let options = ExecuteOptions::default()
//!     .concurrent(ConcurrentOption::Skip)
//!     .override_param("date", "2024-01-31");
//! let triggered = client
//!     .executions()
//!     .execute_with("warehouse", "load", &options)
//!     .await?;
//! println!("execution {}", triggered.exec_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Error signalling
//!
//! The server answers HTTP 200 for failures too, embedding an `error` field
//! or a `status: error` / `message` pair in the JSON body, and sometimes an
//! HTML page instead of JSON. [`decode`] turns those into [`Error::Service`],
//! [`Error::EmptyResponse`] and raw text. An unknown project shows up as an
//! empty body on the flows endpoint and is reported as
//! [`Error::ProjectNotFound`] by every project-scoped call.

pub mod api;
pub mod client;
pub mod decode;
pub mod error;
pub mod package;
mod params;
pub mod types;

pub use api::{
    schedule_date, schedule_time, ConcurrentOption, ExecuteOptions, ExecutionsApi, FailureAction,
    FlowsApi, ProjectsApi, SchedulesApi,
};
pub use client::{AzkabanClient, ClientBuilder};
pub use decode::{Decoded, Destination};
pub use error::{Error, Result};
pub use package::{package_job, zip_bytes, zip_files, JobFile};
pub use types::*;
