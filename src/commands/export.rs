//! Toggl → tracker: writes per-day work logs for a date range.

use super::{Backend, Context, RangeArgs};
use crate::api::toggl::Toggl;
use crate::api::{Session, Tracker};
use crate::libs::aggregate::aggregate;
use crate::libs::error::SyncError;
use crate::libs::formatter::format_minutes;
use crate::libs::messages::Message;
use crate::libs::options::SyncOptions;
use crate::libs::period::Period;
use crate::libs::reconcile::ProjectIndex;
use crate::{msg_error, msg_info, msg_print, msg_warning};
use anyhow::Result;
use chrono::Utc;

pub async fn cmd(context: &mut Context, args: &RangeArgs) -> Result<()> {
    let period = resolve_period(context, args)?;
    context.toggl.get_session_id(&context.credentials).await?;
    match &mut context.backend {
        Backend::Shotgun(tracker) => {
            tracker.connect(&context.credentials).await?;
            run(&mut context.toggl, tracker, &period, &context.options).await
        }
        Backend::Jira(tracker) => {
            tracker.connect(&context.credentials).await?;
            run(&mut context.toggl, tracker, &period, &context.options).await
        }
    }
}

pub(super) fn resolve_period(context: &Context, args: &RangeArgs) -> Result<Period> {
    Period::resolve(
        args.start.as_deref(),
        args.end.as_deref(),
        context.days_back,
        Utc::now(),
        context.options.offset,
    )
}

/// Aggregates the period's time entries and upserts one work log per
/// (day, ticket, task).
pub async fn run<T: Tracker>(toggl: &mut Toggl, tracker: &mut T, period: &Period, options: &SyncOptions) -> Result<()> {
    if options.dry_run {
        msg_info!(Message::DryRun);
    }

    let projects = tracker.filter_projects(toggl.projects().await?)?;
    let pattern = tracker.name_pattern()?;
    let index = ProjectIndex::build(&projects, &pattern);
    for ticket in &index.ambiguous {
        msg_warning!(Message::ProjectAmbiguous(ticket.to_string()));
    }

    let entries = toggl.time_entries(period.start, period.end).await?;
    let logs = aggregate(
        &entries,
        &index.project_to_ticket(),
        &period.days,
        options.offset,
        options.zero_duration,
    );

    let mut current_day = None;
    let mut failed = 0;
    for log in &logs {
        if current_day != Some(log.day) {
            msg_print!(Message::WorkLogDay(log.day.format("%Y-%m-%d, %A").to_string()));
            current_day = Some(log.day);
        }
        match tracker.upsert_work_log(log, options.dry_run).await {
            Ok(upsert) => msg_print!(Message::WorkLogLine {
                ticket: log.ticket.to_string(),
                task: log.task.clone(),
                duration: format_minutes(log.minutes),
                outcome: upsert.describe(options.dry_run).to_string(),
            }),
            Err(err) => {
                failed += 1;
                msg_error!(Message::WorkLogFailed {
                    ticket: log.ticket.to_string(),
                    task: log.task.clone(),
                    day: log.day.to_string(),
                    error: format!("{:#}", err),
                });
            }
        }
    }

    if failed > 0 {
        return Err(SyncError::domain(Message::ChangesFailed(failed, logs.len())).into());
    }
    Ok(())
}
