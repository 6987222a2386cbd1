//! Doctor command for reporting inconsistent log entries.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use wl_core::{Log, diagnose};

/// Writes one line per problem found and returns how many there were.
///
/// Problems are informational; the command still succeeds.
pub fn run<E: Write>(err: &mut E, log: &Log, today: NaiveDate) -> Result<usize> {
    let found = diagnose(log, today);
    for diagnosis in &found {
        writeln!(err, "{diagnosis}")?;
    }
    Ok(found.len())
}
