//! Log command for listing recent entries, newest first.

use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use wl_core::{Category, Event, Log, TaskId};

const DEFAULT_PAGER: &str = "less";

/// Which entries to show and how.
#[derive(Debug, Clone, Copy)]
pub struct LogOptions {
    /// `None` shows every entry.
    pub number: Option<usize>,
    pub category: Option<Category>,
    pub no_pager: bool,
    pub pager_threshold: usize,
}

impl LogOptions {
    /// Long listings go through the pager unless it is disabled.
    pub fn wants_pager(&self) -> bool {
        !self.no_pager && self.number.is_none_or(|n| n > self.pager_threshold)
    }
}

fn format_row(event: &Event) -> String {
    let log_time = event.log_time();
    let row = format!(
        "{}  {}  {:<7}  {:<5}  {}",
        log_time.format("%Y-%m-%d"),
        log_time.format("%H:%M:%S"),
        event.category(),
        event.kind(),
        event.identifier().map(TaskId::as_str).unwrap_or_default()
    );
    row.trim_end().to_string()
}

/// Renders the selected entries, one per line.
pub fn format_entries(log: &Log, number: Option<usize>, category: Option<Category>) -> String {
    log.recent(number, category)
        .into_iter()
        .map(|event| format_row(event) + "\n")
        .collect()
}

/// Sends `text` through `$PAGER`, falling back to `less`.
fn page(text: &str) -> Result<()> {
    let pager = std::env::var("PAGER")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAGER.to_string());
    let mut parts = pager.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("empty pager command");
    };

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start pager {program:?}"))?;
    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(text.as_bytes()) {
            // The pager quit before reading everything.
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
            other => other.context("failed to write to pager")?,
        }
    }
    let status = child.wait().context("pager failed")?;
    tracing::debug!(%status, "pager exited");
    Ok(())
}

/// Runs the log command.
pub fn run<W: Write>(writer: &mut W, log: &Log, options: LogOptions) -> Result<()> {
    if log.is_empty() {
        writeln!(writer, "No data available")?;
        return Ok(());
    }

    let text = format_entries(log, options.number, options.category);
    if options.wants_pager() && io::stdout().is_terminal() {
        tracing::debug!("paging log output");
        match page(&text) {
            Ok(()) => return Ok(()),
            Err(err) => tracing::warn!("{err:#}, printing directly"),
        }
    }
    write!(writer, "{text}")?;
    Ok(())
}
