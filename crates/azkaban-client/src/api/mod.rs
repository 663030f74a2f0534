//! API endpoint implementations.

mod executions;
mod flows;
mod projects;
mod schedules;

pub use executions::{ConcurrentOption, ExecuteOptions, ExecutionsApi, FailureAction};
pub use flows::FlowsApi;
pub use projects::ProjectsApi;
pub use schedules::{schedule_date, schedule_time, SchedulesApi};
