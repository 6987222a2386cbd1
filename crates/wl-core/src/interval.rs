//! Pairing start/stop events into closed intervals.
//!
//! # Algorithm
//!
//! Events of one partition are scanned in log-time order while holding at
//! most one pending start:
//!
//! 1. A start while another start is pending drops the *earlier* start and
//!    reports it as unmatched.
//! 2. A stop with nothing pending is reported and ignored.
//! 3. A stop with a pending start closes an interval dated on the start.
//! 4. A start still pending at the end is reported as unmatched.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::event::{Event, Kind};
use crate::types::TaskId;

/// A closed span between a matched start and stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<TaskId>,
    pub start: DateTime<FixedOffset>,
    pub stop: DateTime<FixedOffset>,
}

impl Interval {
    pub fn duration(&self) -> Duration {
        self.stop - self.start
    }
}

/// An event that could not be paired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// A start entry was never closed by a stop.
    UnmatchedStart { at: DateTime<FixedOffset> },
    /// A stop entry appeared with no open start.
    UnmatchedStop { at: DateTime<FixedOffset> },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedStart { at } => {
                write!(f, "start entry at {at} has no matching stop, skipped")
            }
            Self::UnmatchedStop { at } => {
                write!(f, "stop entry at {at} has no matching start, skipped")
            }
        }
    }
}

/// One step of the pairing scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    Interval(Interval),
    Anomaly(Anomaly),
}

/// Lazy pairing iterator over the events of one partition.
///
/// Cloning the iterator restarts the scan from the clone's position.
#[derive(Debug, Clone)]
pub struct Pairings<'a, I> {
    events: I,
    pending: Option<&'a Event>,
    done: bool,
}

impl<'a, I> Iterator for Pairings<'a, I>
where
    I: Iterator<Item = &'a Event>,
{
    type Item = Pairing;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let Some(event) = self.events.next() else {
                self.done = true;
                return self.pending.take().map(|start| {
                    Pairing::Anomaly(Anomaly::UnmatchedStart {
                        at: start.log_time(),
                    })
                });
            };

            match (event.kind(), self.pending) {
                (Kind::Start, Some(earlier)) => {
                    self.pending = Some(event);
                    return Some(Pairing::Anomaly(Anomaly::UnmatchedStart {
                        at: earlier.log_time(),
                    }));
                }
                (Kind::Start, None) => self.pending = Some(event),
                (Kind::Stop, None) => {
                    return Some(Pairing::Anomaly(Anomaly::UnmatchedStop {
                        at: event.log_time(),
                    }));
                }
                (Kind::Stop, Some(start)) => {
                    self.pending = None;
                    return Some(Pairing::Interval(Interval {
                        date: start.date(),
                        identifier: start.identifier().cloned(),
                        start: start.log_time(),
                        stop: event.log_time(),
                    }));
                }
            }
        }
    }
}

/// Starts a pairing scan over events of a single partition, already in log-time order.
pub fn pairings<'a, I>(events: I) -> Pairings<'a, I::IntoIter>
where
    I: IntoIterator<Item = &'a Event>,
{
    Pairings {
        events: events.into_iter(),
        pending: None,
        done: false,
    }
}

/// Result of a complete pairing scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub intervals: Vec<Interval>,
    pub anomalies: Vec<Anomaly>,
}

impl Extraction {
    /// Sum of all interval durations.
    pub fn total(&self) -> Duration {
        self.intervals
            .iter()
            .map(Interval::duration)
            .fold(Duration::zero(), |acc, d| acc + d)
    }
}

/// Pairs the events of one partition into intervals, collecting anomalies.
pub fn extract_intervals<'a, I>(events: I) -> Extraction
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut extraction = Extraction::default();
    for step in pairings(events) {
        match step {
            Pairing::Interval(interval) => extraction.intervals.push(interval),
            Pairing::Anomaly(anomaly) => {
                tracing::warn!(%anomaly, "unpaired log entry");
                extraction.anomalies.push(anomaly);
            }
        }
    }
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn session(kind: Kind, time: &str) -> Event {
        Event::session(kind, at(&format!("2024-01-15T{time}:00+01:00")))
    }

    #[test]
    fn pairs_alternating_events() {
        let events = [
            session(Kind::Start, "09:00"),
            session(Kind::Stop, "12:00"),
            session(Kind::Start, "13:00"),
            session(Kind::Stop, "17:30"),
        ];

        let extraction = extract_intervals(&events);
        assert!(extraction.anomalies.is_empty());
        assert_eq!(extraction.intervals.len(), 2);
        assert_eq!(extraction.intervals[0].duration(), Duration::hours(3));
        assert_eq!(extraction.total(), Duration::minutes(7 * 60 + 30));
        assert!(extraction.intervals.iter().all(|i| i.stop > i.start));
    }

    #[test]
    fn double_start_drops_the_earlier_start() {
        let events = [
            session(Kind::Start, "08:00"),
            session(Kind::Start, "09:00"),
            session(Kind::Stop, "10:00"),
        ];

        let extraction = extract_intervals(&events);
        assert_eq!(
            extraction.anomalies,
            vec![Anomaly::UnmatchedStart {
                at: at("2024-01-15T08:00:00+01:00")
            }]
        );
        assert_eq!(extraction.intervals.len(), 1);
        assert_eq!(extraction.intervals[0].start, at("2024-01-15T09:00:00+01:00"));
    }

    #[test]
    fn stop_without_start_is_skipped() {
        let events = [
            session(Kind::Stop, "08:00"),
            session(Kind::Start, "09:00"),
            session(Kind::Stop, "10:00"),
            session(Kind::Stop, "11:00"),
        ];

        let extraction = extract_intervals(&events);
        assert_eq!(extraction.intervals.len(), 1);
        assert_eq!(extraction.anomalies.len(), 2);
        assert!(
            extraction
                .anomalies
                .iter()
                .all(|a| matches!(a, Anomaly::UnmatchedStop { .. }))
        );
    }

    #[test]
    fn trailing_start_is_reported() {
        let events = [
            session(Kind::Start, "09:00"),
            session(Kind::Stop, "10:00"),
            session(Kind::Start, "11:00"),
        ];

        let extraction = extract_intervals(&events);
        assert_eq!(extraction.intervals.len(), 1);
        assert_eq!(
            extraction.anomalies,
            vec![Anomaly::UnmatchedStart {
                at: at("2024-01-15T11:00:00+01:00")
            }]
        );
    }

    #[test]
    fn anomaly_count_matches_unpaired_events() {
        // start start stop stop start: one dropped start, one orphan stop, one open start
        let events = [
            session(Kind::Start, "08:00"),
            session(Kind::Start, "09:00"),
            session(Kind::Stop, "10:00"),
            session(Kind::Stop, "11:00"),
            session(Kind::Start, "12:00"),
        ];

        let extraction = extract_intervals(&events);
        assert_eq!(extraction.intervals.len(), 1);
        assert_eq!(extraction.anomalies.len(), 3);
    }

    #[test]
    fn interval_is_dated_on_its_start() {
        let events = [
            Event::session(Kind::Start, at("2024-01-15T22:00:00+01:00")),
            Event::session(Kind::Stop, at("2024-01-16T01:00:00+01:00")),
        ];

        let extraction = extract_intervals(&events);
        assert_eq!(
            extraction.intervals[0].date,
            "2024-01-15".parse::<NaiveDate>().unwrap()
        );
        assert_eq!(extraction.intervals[0].duration(), Duration::hours(3));
    }

    #[test]
    fn task_intervals_carry_identifier() {
        let id = TaskId::new("review").unwrap();
        let events = [
            Event::task(id.clone(), Kind::Start, at("2024-01-15T09:00:00+01:00")),
            Event::task(id.clone(), Kind::Stop, at("2024-01-15T09:45:00+01:00")),
        ];

        let extraction = extract_intervals(&events);
        assert_eq!(extraction.intervals[0].identifier, Some(id));
    }

    #[test]
    fn pairings_are_lazy_and_restartable() {
        let events = [
            session(Kind::Start, "09:00"),
            session(Kind::Stop, "10:00"),
            session(Kind::Stop, "11:00"),
        ];

        let mut scan = pairings(&events);
        let first = scan.next();
        assert!(matches!(first, Some(Pairing::Interval(_))));

        let rest: Vec<_> = scan.clone().collect();
        assert_eq!(rest, scan.collect::<Vec<_>>());
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn empty_partition_yields_nothing() {
        let extraction = extract_intervals(std::iter::empty());
        assert_eq!(extraction, Extraction::default());
    }
}
