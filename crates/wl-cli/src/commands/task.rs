//! Task commands: listing identifiers and per-task time reports.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use wl_core::{Log, ReportError, TaskId, TaskReport, task_report};

use super::util::format_hms;

/// Writes every task identifier ever committed, one per line.
pub fn list<W: Write>(writer: &mut W, log: &Log) -> Result<()> {
    for id in log.task_ids() {
        writeln!(writer, "{id}")?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct IntervalJson {
    date: String,
    start: DateTime<FixedOffset>,
    stop: DateTime<FixedOffset>,
    seconds: i64,
}

#[derive(Debug, Serialize)]
struct DayJson {
    date: String,
    seconds: i64,
}

#[derive(Debug, Serialize)]
struct ReportJson<'a> {
    task: &'a str,
    active: bool,
    total_seconds: i64,
    days: Vec<DayJson>,
    intervals: Vec<IntervalJson>,
}

fn to_json(report: &TaskReport) -> ReportJson<'_> {
    ReportJson {
        task: report.task.as_str(),
        active: report.is_active,
        total_seconds: report.total.num_seconds(),
        days: report
            .per_day
            .iter()
            .map(|(date, total)| DayJson {
                date: date.to_string(),
                seconds: total.num_seconds(),
            })
            .collect(),
        intervals: report
            .intervals
            .iter()
            .map(|i| IntervalJson {
                date: i.date.to_string(),
                start: i.start,
                stop: i.stop,
                seconds: i.duration().num_seconds(),
            })
            .collect(),
    }
}

/// Formats the human-readable report.
pub fn format_report(report: &TaskReport) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    let status = if report.is_active { " (running)" } else { "" };
    writeln!(output, "Task: {}{status}", report.task).unwrap();

    writeln!(output).unwrap();
    writeln!(output, "Intervals:").unwrap();
    for interval in &report.intervals {
        writeln!(
            output,
            "  {}  {} - {}  {}",
            interval.date,
            interval.start.format("%H:%M:%S"),
            interval.stop.format("%H:%M:%S"),
            format_hms(interval.duration())
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Per day:").unwrap();
    for (date, total) in &report.per_day {
        writeln!(output, "  {date}  {}", format_hms(*total)).unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Total: {}", format_hms(report.total)).unwrap();
    output
}

/// Runs `task report` for one identifier.
pub fn report<W: Write>(
    writer: &mut W,
    log: &Log,
    id: &str,
    json: bool,
    now: DateTime<FixedOffset>,
) -> Result<()> {
    let id = TaskId::new(id).context("invalid task identifier")?;
    let report = match task_report(log, &id, now) {
        Ok(report) => report,
        Err(err @ ReportError::UnknownTask(_)) => {
            return Err(anyhow::Error::new(err).context("use 'wl task list' to see known tasks"));
        }
        Err(err) => return Err(err.into()),
    };

    if json {
        let json = serde_json::to_string_pretty(&to_json(&report))?;
        writeln!(writer, "{json}")?;
    } else {
        write!(writer, "{}", format_report(&report))?;
    }
    Ok(())
}
