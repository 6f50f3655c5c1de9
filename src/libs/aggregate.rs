//! Grouping of Toggl time entries into per-day work logs.

use super::period::{local_day, DayRange};
use super::ticket::TicketId;
use crate::api::toggl::TimeEntry;
use chrono::{FixedOffset, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// What to do with a group whose finished entries add up to less than one
/// minute.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZeroDurationPolicy {
    /// Leave the group out.
    #[default]
    Skip,
    /// Log it as one minute, as long as at least one entry in it has stopped.
    Minimum,
}

/// One work-log record: time spent on a task of a ticket during one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLog {
    pub ticket: TicketId,
    pub task: String,
    pub day: NaiveDate,
    pub minutes: u32,
}

#[derive(Default)]
struct Group {
    seconds: i64,
    finished: usize,
}

/// Sums time entries per (local day, project, task description).
///
/// Running entries (negative duration) are left out of the sums, entries
/// outside `days` or on projects without a ticket are ignored, and the
/// result is ordered by day, then project id, then task.
pub fn aggregate(
    entries: &[TimeEntry],
    project_to_ticket: &HashMap<u64, TicketId>,
    days: &DayRange,
    offset: FixedOffset,
    policy: ZeroDurationPolicy,
) -> Vec<WorkLog> {
    let mut groups: BTreeMap<(NaiveDate, u64, String), Group> = BTreeMap::new();

    for entry in entries {
        let Some(project_id) = entry.project_id else {
            continue;
        };
        if !project_to_ticket.contains_key(&project_id) {
            continue;
        }
        let day = local_day(entry.start, offset);
        if !days.contains(day) {
            continue;
        }

        let task = entry.description.clone().unwrap_or_default();
        let group = groups.entry((day, project_id, task)).or_default();
        if entry.duration >= 0 {
            group.seconds += entry.duration;
            group.finished += 1;
        }
    }

    groups
        .into_iter()
        .filter_map(|((day, project_id, task), group)| {
            let minutes = u32::try_from(group.seconds / 60).unwrap_or(u32::MAX);
            let minutes = match policy {
                ZeroDurationPolicy::Skip if minutes == 0 => return None,
                ZeroDurationPolicy::Minimum if group.finished == 0 => return None,
                ZeroDurationPolicy::Minimum => minutes.max(1),
                ZeroDurationPolicy::Skip => minutes,
            };
            Some(WorkLog {
                ticket: project_to_ticket[&project_id].clone(),
                task,
                day,
                minutes,
            })
        })
        .collect()
}
