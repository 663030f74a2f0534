//! Schedules API.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use reqwest::Method;
use tracing::info;

use crate::client::AzkabanClient;
use crate::error::Result;
use crate::params::Params;
use crate::types::{Project, StatusDetail};

/// Format a time the way the schedule form expects: `hh,mm,am|pm,ZONE`.
pub fn schedule_time<Tz>(when: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    when.format("%I,%M,%P,%Z").to_string()
}

/// Format a date the way the schedule form expects: `MM/DD/YYYY`.
pub fn schedule_date<Tz>(when: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    when.format("%m/%d/%Y").to_string()
}

/// Schedules API client.
pub struct SchedulesApi<'a> {
    client: &'a AzkabanClient,
}

impl<'a> SchedulesApi<'a> {
    pub(crate) fn new(client: &'a AzkabanClient) -> Self {
        Self { client }
    }

    /// Schedule a flow.
    ///
    /// `period` is the server's recurrence notation (`1d`, `12h`, `30m`, ...)
    /// and only applies when `recurring` is set.
    pub async fn schedule<Tz>(
        &self,
        project: &Project,
        flow: &str,
        when: &DateTime<Tz>,
        recurring: bool,
        period: &str,
    ) -> Result<StatusDetail>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let detail = self.submit(project, flow, when, recurring, period).await?;
        info!(project = %project.name, flow, "Scheduled flow");
        Ok(detail)
    }

    /// Unschedule a flow.
    ///
    /// Sends the same request as [`schedule`](Self::schedule).
    pub async fn unschedule<Tz>(
        &self,
        project: &Project,
        flow: &str,
        when: &DateTime<Tz>,
        recurring: bool,
        period: &str,
    ) -> Result<StatusDetail>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let detail = self.submit(project, flow, when, recurring, period).await?;
        info!(project = %project.name, flow, "Unscheduled flow");
        Ok(detail)
    }

    async fn submit<Tz>(
        &self,
        project: &Project,
        flow: &str,
        when: &DateTime<Tz>,
        recurring: bool,
        period: &str,
    ) -> Result<StatusDetail>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let params = schedule_params(
            self.client.session_params(),
            project,
            flow,
            &schedule_time(when),
            &schedule_date(when),
            recurring,
            period,
        );

        self.client.projects().get(&project.name).await?;
        self.client.call(Method::POST, "/schedule", &params).await
    }
}

fn schedule_params(
    params: Params,
    project: &Project,
    flow: &str,
    time: &str,
    date: &str,
    recurring: bool,
    period: &str,
) -> Params {
    params
        .add("ajax", "scheduleFlow")
        .add("projectId", project.id.to_string())
        .add("projectName", project.name.as_str())
        .add("flow", flow)
        .add("scheduleTime", time)
        .add("scheduleDate", date)
        .add("is_recurring", if recurring { "on" } else { "off" })
        .add("period", period)
}
