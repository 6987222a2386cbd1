//! Core domain logic for the work log.
//!
//! This crate contains the event model and everything derived from it:
//! - Log: the ordered event sequence and its grouping helpers
//! - Intervals: pairing start/stop events, sentinel stops for open work
//! - Status: daily elapsed, remaining, and overtime figures
//! - Doctor: start/stop alternation checks
//! - Reports: per-task time summaries

pub mod doctor;
pub mod event;
pub mod interval;
pub mod log;
pub mod report;
pub mod sentinel;
pub mod status;
pub mod time;
mod types;

pub use doctor::{Diagnosis, Issue, diagnose};
pub use event::{Category, Event, Kind, Partition};
pub use interval::{Anomaly, Extraction, Interval, extract_intervals};
pub use log::Log;
pub use report::{ReportError, TaskReport, task_report};
pub use sentinel::{FutureDateError, sentinel_datetime, sentinel_stop};
pub use status::{DailyFacts, StatusError, daily_facts};
pub use time::{TimeSpecError, resolve_log_time};
pub use types::{TaskId, ValidationError, WorkdayTargets};
