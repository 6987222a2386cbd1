//! Consistency checks over the whole log.
//!
//! Every `(date, category, identifier)` partition must alternate start/stop,
//! beginning with a start and ending with a stop. Today's partitions may
//! still be open.

use std::fmt;

use chrono::NaiveDate;

use crate::event::{Event, Kind, Partition};
use crate::log::Log;

/// What is wrong with a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Issue {
    /// The first entry of the day is a stop.
    FirstEntryNotStart,
    /// Two consecutive entries share the same kind.
    NotOrdered,
    /// The day ends with an unmatched start.
    MissingStop,
}

/// One consistency problem found by [`diagnose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub date: NaiveDate,
    pub partition: Partition,
    pub issue: Issue,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            date,
            partition,
            issue,
        } = self;
        match issue {
            Issue::FirstEntryNotStart => {
                write!(f, "first {partition} entry on {date} is not \"start\"")
            }
            Issue::NotOrdered => write!(f, "{partition} entries on {date} are not ordered correctly"),
            Issue::MissingStop => write!(f, "{partition} on {date} has no stop entry"),
        }
    }
}

fn check_partition(
    date: NaiveDate,
    partition: &Partition,
    events: &[&Event],
    allow_open: bool,
) -> Vec<Diagnosis> {
    let diagnosis = |issue| Diagnosis {
        date,
        partition: partition.clone(),
        issue,
    };
    let mut found = Vec::new();

    if events.first().is_some_and(|e| e.kind() != Kind::Start) {
        found.push(diagnosis(Issue::FirstEntryNotStart));
    }
    for pair in events.windows(2) {
        if pair[0].kind() == pair[1].kind() {
            found.push(diagnosis(Issue::NotOrdered));
        }
    }
    if !allow_open && events.last().is_some_and(|e| e.kind() == Kind::Start) {
        found.push(diagnosis(Issue::MissingStop));
    }
    found
}

/// Checks every partition of every day; never stops at the first problem.
///
/// Results are ordered by date, then category, then identifier.
pub fn diagnose(log: &Log, today: NaiveDate) -> Vec<Diagnosis> {
    let mut found = Vec::new();
    for (date, partitions) in log.by_date_and_partition() {
        for (partition, events) in &partitions {
            found.extend(check_partition(date, partition, events, date == today));
        }
    }
    tracing::debug!(problems = found.len(), events = log.len(), "log checked");
    found
}
