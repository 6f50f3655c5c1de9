//! Date range handling for the export command.
//!
//! Local days are computed with one fixed UTC offset captured at start-up,
//! not with a timezone database. A run whose range spans a daylight-saving
//! change buckets the entries on one side of it by one hour off. Fixing that
//! would change historical aggregation results, so it is left as is.

use super::error::SyncError;
use super::messages::Message;
use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The offset of the local clock right now.
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Calendar day of `instant` under `offset`.
pub fn local_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DayRange {
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        Self { first, last }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.first <= day && day <= self.last
    }
}

/// Time window requested from Toggl plus the days it covers locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: DayRange,
}

impl Period {
    /// Resolves the `--start` / `--end` flags.
    ///
    /// `start` defaults to local midnight `days_back` days before `now`;
    /// `end` defaults to `now`. A given end date is inclusive: the window
    /// closes at the following local midnight.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        days_back: i64,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Result<Self> {
        let today = local_day(now, offset);

        let first = match start {
            Some(date) => parse_date(date)?,
            None => Duration::try_days(days_back)
                .and_then(|back| today.checked_sub_signed(back))
                .ok_or_else(|| SyncError::domain(Message::InvalidDaysBack(days_back)))?,
        };
        let (last, end_instant) = match end {
            Some(date) => {
                let last = parse_date(date)?;
                let next = last
                    .succ_opt()
                    .ok_or_else(|| SyncError::domain(Message::InvalidDate(date.to_string())))?;
                (last, midnight(next, offset))
            }
            None => (today, now),
        };

        if first > last {
            return Err(SyncError::domain(Message::InvalidDateRange(
                first.format(DATE_FORMAT).to_string(),
                last.format(DATE_FORMAT).to_string(),
            ))
            .into());
        }

        Ok(Self {
            start: midnight(first, offset),
            end: end_instant,
            days: DayRange::new(first, last),
        })
    }
}

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| SyncError::domain(Message::InvalidDate(date.to_string())).into())
}

/// UTC instant of local midnight at the start of `day`.
fn midnight(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::MIN);
    // A fixed offset maps every local time to exactly one instant.
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}
