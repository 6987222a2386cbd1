//! Commit command for recording start/stop entries.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use wl_core::{Category, Kind, TaskId};
use wl_store::{CommitRequest, Store, StoreError};

/// Builds a commit request from command-line values.
pub fn request(
    category: Category,
    kind: Kind,
    id: Option<&str>,
    offset_minutes: i64,
    time: Option<&str>,
    force: bool,
) -> Result<CommitRequest> {
    let identifier = id
        .map(TaskId::new)
        .transpose()
        .context("invalid task identifier")?;
    Ok(CommitRequest {
        offset_minutes,
        time: time.map(String::from),
        force,
        ..CommitRequest::new(category, kind, identifier)
    })
}

/// Runs the commit command against the store, as of `now`.
pub fn run<Tz: TimeZone>(
    store: &mut Store,
    request: &CommitRequest,
    now: &DateTime<Tz>,
) -> Result<()> {
    match store.commit_at(request, now) {
        Ok(event) => {
            tracing::debug!(log_time = %event.log_time(), "commit done");
            Ok(())
        }
        Err(err @ StoreError::ActiveTasks(_)) => Err(anyhow::Error::new(err)
            .context("cannot stop the session, use --force to stop running tasks first")),
        Err(err) => Err(err).context("failed to commit entry"),
    }
}
