//! Daily work-time status: elapsed, remaining, and overtime against targets.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use thiserror::Error;

use crate::event::{Category, Event};
use crate::interval::extract_intervals;
use crate::log::Log;
use crate::sentinel::{FutureDateError, is_active, sentinel_stop};
use crate::types::{TaskId, WorkdayTargets};

/// Reasons no status can be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// The log holds no events at all.
    #[error("no log data available")]
    EmptyLog,

    /// The log has events, but none on the queried date.
    #[error("no log data available for {0}")]
    NoDataForDate(NaiveDate),

    #[error(transparent)]
    FutureDate(#[from] FutureDateError),
}

/// Derived facts about one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyFacts {
    pub date: NaiveDate,
    /// The session was still open at the end of the day's events.
    pub is_active: bool,
    pub total_time: Duration,
    pub remaining_time: Duration,
    pub overtime: Duration,
    pub percentage: i64,
    pub percentage_remaining: i64,
    pub percentage_overtime: i64,
    /// Clock time at which the target is reached if work continues from now.
    pub end_of_work: DateTime<FixedOffset>,
    pub active_tasks: Vec<TaskId>,
}

impl DailyFacts {
    /// End of work only means something for a running session today.
    pub fn shows_end_of_work(&self, today: NaiveDate) -> bool {
        self.is_active && self.date == today
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn ratio_percent(part: Duration, whole: Duration) -> i64 {
    (part.num_seconds() as f64 / whole.num_seconds() as f64 * 100.0).round() as i64
}

/// Computes the status for `date`.
///
/// Session events of that date are paired into intervals; an open session is
/// closed at the sentinel time so that work in progress counts.
pub fn daily_facts(
    log: &Log,
    date: NaiveDate,
    targets: WorkdayTargets,
    now: DateTime<FixedOffset>,
) -> Result<DailyFacts, StatusError> {
    if log.is_empty() {
        return Err(StatusError::EmptyLog);
    }

    let day: Vec<&Event> = log.on_date(date).collect();
    if day.is_empty() {
        return Err(StatusError::NoDataForDate(date));
    }

    let mut sessions: Vec<&Event> = day
        .iter()
        .copied()
        .filter(|e| e.category() == Category::Session)
        .collect();
    let is_active = is_active(sessions.iter().copied());
    tracing::debug!(%date, is_active, "computing daily status");

    let sentinel = sentinel_stop(sessions.iter().copied(), &now, date)?;
    if let Some(stop) = &sentinel {
        sessions.push(stop);
    }

    let total_time = extract_intervals(sessions).total();
    let zero = Duration::zero();
    let target = targets.hours_target;

    let remaining_time = (target - total_time).max(zero);
    let overtime = (total_time - target).max(zero);
    let percentage = ratio_percent(total_time, target);

    Ok(DailyFacts {
        date,
        is_active,
        total_time,
        remaining_time,
        overtime,
        percentage,
        percentage_remaining: (100 - percentage).max(0),
        percentage_overtime: ratio_percent(overtime, targets.hours_max - target).max(0),
        end_of_work: now + (target - total_time),
        active_tasks: log.active_task_ids(date),
    })
}
