//! Status command for showing how much of the work day is done.

use std::io::Write;
use std::sync::LazyLock;

use anyhow::{Result, bail};
use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::{Captures, Regex};
use wl_core::{DailyFacts, Log, StatusError, TaskId, WorkdayTargets, daily_facts};

use super::util::{format_hm, format_hms};

/// Pre-compiled regex for `{placeholder}` fields in `--fmt` templates.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Shown in place of the status when `--fmt` is used and there is no data.
const SHORT_NOT_AVAILABLE: &str = "N/A";

/// Renders the default multi-line status block.
pub fn format_block(facts: &DailyFacts, today: NaiveDate) -> String {
    let mut lines = vec![
        (
            "Status",
            (if facts.is_active {
                "Tracking on"
            } else {
                "Tracking off"
            })
            .to_string(),
        ),
        (
            "Total time",
            format!("{} ({:>3}%)", format_hms(facts.total_time), facts.percentage),
        ),
        (
            "Remaining time",
            format!(
                "{} ({:>3}%)",
                format_hms(facts.remaining_time),
                facts.percentage_remaining
            ),
        ),
        (
            "Overtime",
            format!(
                "{} ({:>3}%)",
                format_hms(facts.overtime),
                facts.percentage_overtime
            ),
        ),
    ];
    if facts.shows_end_of_work(today) {
        lines.push((
            "End of work",
            facts.end_of_work.format("%H:%M:%S").to_string(),
        ));
    }
    if !facts.active_tasks.is_empty() {
        lines.push(("Active tasks", join_ids(&facts.active_tasks)));
    }

    let width = lines.iter().map(|(key, _)| key.len()).max().unwrap_or(0) + 1;
    lines
        .iter()
        .map(|(key, value)| format!("{key:<width$}: {value}\n"))
        .collect()
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter().map(TaskId::as_str).collect::<Vec<_>>().join(", ")
}

fn field(facts: &DailyFacts, name: &str) -> Option<String> {
    let value = match name {
        "status" => (if facts.is_active { "on" } else { "off" }).to_string(),
        "percentage" => facts.percentage.to_string(),
        "end_of_work" => facts.end_of_work.format("%H:%M:%S").to_string(),
        "total_time" => format_hms(facts.total_time),
        "remaining_time" => format_hms(facts.remaining_time),
        "remaining_time_short" => format_hm(facts.remaining_time),
        "percentage_remaining" => facts.percentage_remaining.to_string(),
        "overtime" => format_hms(facts.overtime),
        "overtime_short" => format_hm(facts.overtime),
        "percentage_overtime" => facts.percentage_overtime.to_string(),
        "active_tasks" => join_ids(&facts.active_tasks),
        _ => return None,
    };
    Some(value)
}

/// Fills a user template such as `"{total_time} ({percentage}%)"`.
pub fn format_template(template: &str, facts: &DailyFacts) -> Result<String> {
    let mut unknown = Vec::new();
    let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &Captures<'_>| {
        field(facts, &caps[1]).unwrap_or_else(|| {
            unknown.push(caps[1].to_string());
            String::new()
        })
    });
    if !unknown.is_empty() {
        bail!("unknown placeholder in --fmt: {{{}}}", unknown.join("}, {"));
    }
    Ok(rendered.into_owned())
}

/// Runs the status command.
///
/// Missing data is not an error: a message goes to `err` (default output)
/// or `N/A` to `out` (template output).
pub fn run<W: Write, E: Write>(
    out: &mut W,
    err: &mut E,
    log: &Log,
    targets: WorkdayTargets,
    query_date: NaiveDate,
    fmt: Option<&str>,
    now: DateTime<FixedOffset>,
) -> Result<()> {
    let facts = match daily_facts(log, query_date, targets, now) {
        Ok(facts) => facts,
        Err(e @ (StatusError::EmptyLog | StatusError::NoDataForDate(_))) => {
            if fmt.is_some() {
                write!(out, "{SHORT_NOT_AVAILABLE}")?;
            } else if matches!(e, StatusError::EmptyLog) {
                writeln!(
                    err,
                    "No log data available. Start a new log entry with 'wl commit session start'."
                )?;
            } else {
                writeln!(err, "No log data available for {query_date}.")?;
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match fmt {
        Some(template) => write!(out, "{}", format_template(template, &facts)?)?,
        None => write!(out, "{}", format_block(&facts, now.date_naive()))?,
    }
    Ok(())
}
