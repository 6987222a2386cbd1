//! Per-task time reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use thiserror::Error;

use crate::event::{Event, Partition};
use crate::interval::{Anomaly, Interval, extract_intervals};
use crate::log::Log;
use crate::sentinel::{FutureDateError, sentinel_stop};
use crate::types::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// No event in the log carries this identifier.
    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    #[error(transparent)]
    FutureDate(#[from] FutureDateError),
}

/// Time spent on one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: TaskId,
    pub intervals: Vec<Interval>,
    pub per_day: BTreeMap<NaiveDate, Duration>,
    pub total: Duration,
    /// The task is running right now.
    pub is_active: bool,
    pub anomalies: Vec<Anomaly>,
}

/// Builds the report for `task`.
///
/// A task left running today is closed at `now`. Starts left open on earlier
/// days are reported as anomalies and not counted.
pub fn task_report(
    log: &Log,
    task: &TaskId,
    now: DateTime<FixedOffset>,
) -> Result<TaskReport, ReportError> {
    let partition = Partition::task(task.clone());
    let mut events: Vec<&Event> = log.in_partition(&partition).collect();
    if events.is_empty() {
        return Err(ReportError::UnknownTask(task.clone()));
    }

    let today = now.date_naive();
    let open_today: Vec<&Event> = events.iter().copied().filter(|e| e.date() == today).collect();
    let sentinel = sentinel_stop(open_today, &now, today)?;
    if let Some(stop) = &sentinel {
        events.push(stop);
    }

    let extraction = extract_intervals(events);
    let mut per_day: BTreeMap<NaiveDate, Duration> = BTreeMap::new();
    for interval in &extraction.intervals {
        let day = per_day.entry(interval.date).or_insert_with(Duration::zero);
        *day = *day + interval.duration();
    }

    Ok(TaskReport {
        task: task.clone(),
        total: extraction.total(),
        intervals: extraction.intervals,
        per_day,
        is_active: sentinel.is_some(),
        anomalies: extraction.anomalies,
    })
}
