//! Storage layer for the work log.
//!
//! Events live in a plain text file, one event per line (see [`record`]).
//! The whole file is loaded into memory when the store is opened; every
//! commit appends one line and flushes it before returning.
//!
//! # Concurrency
//!
//! The store assumes it is the only writer. There is no file locking, two
//! processes committing at the same time may interleave or lose lines.

pub mod record;

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, TimeZone};
use thiserror::Error;

use wl_core::{Category, Event, Kind, Log, TaskId, TimeSpecError, ValidationError};

use crate::record::RecordError;

/// Default field separator.
pub const DEFAULT_SEPARATOR: char = '|';

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored line could not be parsed; the log is not usable.
    #[error("corrupt record in {path} at line {line}: {source}")]
    CorruptRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: RecordError,
    },

    /// The separator cannot be used to delimit fields.
    #[error("invalid separator {0:?}")]
    InvalidSeparator(char),

    /// The identifier would break the line format.
    #[error("task ID {id:?} contains the separator {separator:?}")]
    SeparatorInIdentifier { id: String, separator: char },

    /// A session cannot stop while tasks are running.
    #[error("{} still active", format_ids(.0))]
    ActiveTasks(Vec<TaskId>),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Time(#[from] TimeSpecError),
}

fn format_ids(ids: &[TaskId]) -> String {
    let names: Vec<&str> = ids.iter().map(TaskId::as_str).collect();
    match names.as_slice() {
        [one] => format!("task {one} is"),
        _ => format!("tasks {} are", names.join(", ")),
    }
}

/// What to record.
#[derive(Debug, Clone)]
pub struct CommitRequest {
    pub category: Category,
    pub kind: Kind,
    pub identifier: Option<TaskId>,
    /// Minutes added to the current time; negative values backdate.
    pub offset_minutes: i64,
    /// `HH:MM` or ISO 8601 time replacing the computed log time.
    pub time: Option<String>,
    /// Stop running tasks instead of refusing to stop the session.
    pub force: bool,
}

impl CommitRequest {
    pub const fn new(category: Category, kind: Kind, identifier: Option<TaskId>) -> Self {
        Self {
            category,
            kind,
            identifier,
            offset_minutes: 0,
            time: None,
            force: false,
        }
    }
}

/// The durable work log.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    separator: char,
    log: Log,
}

impl Store {
    /// Opens the log file at `path`, creating it (and its directory) if needed.
    ///
    /// Fails on the first malformed line; there is no partial load.
    pub fn open(path: &Path, separator: char) -> Result<Self, StoreError> {
        if separator.is_alphanumeric() || matches!(separator, '\n' | '\r' | '-' | ':' | '+') {
            return Err(StoreError::InvalidSeparator(separator));
        }
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
            .map_err(io_err)?;

        let mut events = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let event =
                record::decode(&line, separator).map_err(|source| StoreError::CorruptRecord {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                })?;
            events.push(event);
        }
        tracing::debug!(path = %path.display(), events = events.len(), "loaded work log");

        Ok(Self {
            path: path.to_path_buf(),
            separator,
            log: Log::from_events(events),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn log(&self) -> &Log {
        &self.log
    }

    /// Writes one event to the end of the file and adds it to the in-memory log.
    pub fn append(&mut self, event: Event) -> Result<(), StoreError> {
        if let Some(id) = event.identifier() {
            if id.as_str().contains(self.separator) {
                return Err(StoreError::SeparatorInIdentifier {
                    id: id.to_string(),
                    separator: self.separator,
                });
            }
        }

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        writeln!(file, "{}", record::encode(&event, self.separator)).map_err(io_err)?;
        file.sync_data().map_err(io_err)?;

        tracing::info!(
            category = %event.category(),
            kind = %event.kind(),
            log_time = %event.log_time(),
            "event committed"
        );
        self.log.insert(event);
        Ok(())
    }

    /// Records a start or stop at the current local time.
    pub fn commit(&mut self, request: &CommitRequest) -> Result<Event, StoreError> {
        self.commit_at(request, &Local::now())
    }

    /// Records a start or stop as if the clock read `now`.
    ///
    /// Stopping a session while tasks are running on that day fails with
    /// [`StoreError::ActiveTasks`] unless `force` is set; with `force` each
    /// running task is stopped first at the same log time.
    pub fn commit_at<Tz: TimeZone>(
        &mut self,
        request: &CommitRequest,
        now: &DateTime<Tz>,
    ) -> Result<Event, StoreError> {
        let commit_time = wl_core::time::truncate_to_seconds(now.clone()).fixed_offset();
        let log_time =
            wl_core::resolve_log_time(now, request.offset_minutes, request.time.as_deref())?;
        let event = Event::new(
            commit_time,
            log_time,
            request.category,
            request.kind,
            request.identifier.clone(),
        )?;

        if request.category == Category::Session && request.kind == Kind::Stop {
            self.stop_active_tasks(request, now, log_time)?;
        }

        self.append(event.clone())?;
        Ok(event)
    }

    fn stop_active_tasks<Tz: TimeZone>(
        &mut self,
        request: &CommitRequest,
        now: &DateTime<Tz>,
        log_time: DateTime<FixedOffset>,
    ) -> Result<(), StoreError> {
        let active = self.log.active_task_ids(log_time.date_naive());
        if active.is_empty() {
            return Ok(());
        }
        if !request.force {
            return Err(StoreError::ActiveTasks(active));
        }
        for id in active {
            tracing::info!(task = %id, "stopping active task");
            let stop = CommitRequest {
                category: Category::Task,
                kind: Kind::Stop,
                identifier: Some(id),
                ..request.clone()
            };
            self.commit_at(&stop, now)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn task(id: &str) -> TaskId {
        TaskId::new(id).unwrap()
    }

    fn open_temp() -> (tempfile::TempDir, Store) {
        let temp = tempfile::tempdir().unwrap();
        let store = Store::open(&temp.path().join("worklog.log"), DEFAULT_SEPARATOR).unwrap();
        (temp, store)
    }

    #[test]
    fn open_creates_missing_file_and_directory() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested/dir/worklog.log");

        let store = Store::open(&path, DEFAULT_SEPARATOR).unwrap();
        assert!(store.log().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn append_then_reload_roundtrips() {
        let (temp, mut store) = open_temp();
        let event = Event::new(
            at("2024-01-15T09:00:41+01:00"),
            at("2024-01-15T08:45:41+01:00"),
            Category::Task,
            Kind::Start,
            Some(task("review")),
        )
        .unwrap();

        store.append(event.clone()).unwrap();
        let reloaded = Store::open(&temp.path().join("worklog.log"), DEFAULT_SEPARATOR).unwrap();

        assert_eq!(reloaded.log().events(), &[event]);
    }

    #[test]
    fn out_of_order_append_is_sorted_in_memory() {
        let (temp, mut store) = open_temp();
        store
            .append(Event::session(Kind::Stop, at("2024-01-15T17:00:00+01:00")))
            .unwrap();
        store
            .append(Event::session(Kind::Start, at("2024-01-15T09:00:00+01:00")))
            .unwrap();

        assert_eq!(store.log().events()[0].kind(), Kind::Start);

        // The file keeps append order, loading sorts again.
        let content = fs::read_to_string(temp.path().join("worklog.log")).unwrap();
        assert!(content.lines().next().unwrap().ends_with("|stop|"));
        let reloaded = Store::open(store.path(), DEFAULT_SEPARATOR).unwrap();
        assert_eq!(reloaded.log(), store.log());
    }

    #[test]
    fn corrupt_line_fails_the_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("worklog.log");
        fs::write(
            &path,
            "2024-01-15T09:00:00+01:00|2024-01-15T09:00:00+01:00|session|start|\n\
             2024-01-15T17:00:00+01:00|session|stop\n",
        )
        .unwrap();

        let err = Store::open(&path, DEFAULT_SEPARATOR).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRecord { line: 2, .. }));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("worklog.log");
        fs::write(
            &path,
            "\n2024-01-15T09:00:00+01:00|2024-01-15T09:00:00+01:00|session|start|\n\n",
        )
        .unwrap();

        let store = Store::open(&path, DEFAULT_SEPARATOR).unwrap();
        assert_eq!(store.log().len(), 1);
    }

    #[test]
    fn commit_applies_offset() {
        let (_temp, mut store) = open_temp();
        let now = at("2024-01-15T09:30:15+01:00");
        let request = CommitRequest {
            offset_minutes: -30,
            ..CommitRequest::new(Category::Session, Kind::Start, None)
        };

        let event = store.commit_at(&request, &now).unwrap();
        assert_eq!(event.commit_time(), now);
        assert_eq!(event.log_time(), at("2024-01-15T09:00:15+01:00"));
        assert_eq!(store.log().len(), 1);
    }

    #[test]
    fn commit_with_explicit_time() {
        let (_temp, mut store) = open_temp();
        let now = at("2024-01-15T09:30:15+01:00");
        let request = CommitRequest {
            time: Some("08:15".to_string()),
            ..CommitRequest::new(Category::Session, Kind::Start, None)
        };

        let event = store.commit_at(&request, &now).unwrap();
        assert_eq!(event.log_time(), at("2024-01-15T08:15:00+01:00"));
    }

    #[test]
    fn session_stop_refuses_while_tasks_run() {
        let (_temp, mut store) = open_temp();
        let now = at("2024-01-15T17:00:00+01:00");
        store
            .commit_at(
                &CommitRequest::new(Category::Task, Kind::Start, Some(task("A"))),
                &now,
            )
            .unwrap();

        let err = store
            .commit_at(&CommitRequest::new(Category::Session, Kind::Stop, None), &now)
            .unwrap_err();
        match err {
            StoreError::ActiveTasks(ids) => assert_eq!(ids, vec![task("A")]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.log().len(), 1);
    }

    #[test]
    fn forced_session_stop_stops_tasks_first() {
        let (temp, mut store) = open_temp();
        let now = at("2024-01-15T17:00:00+01:00");
        for id in ["B", "A"] {
            store
                .commit_at(
                    &CommitRequest::new(Category::Task, Kind::Start, Some(task(id))),
                    &now,
                )
                .unwrap();
        }

        let request = CommitRequest {
            force: true,
            ..CommitRequest::new(Category::Session, Kind::Stop, None)
        };
        store.commit_at(&request, &now).unwrap();

        let tail: Vec<_> = store.log().events()[2..]
            .iter()
            .map(|e| (e.category(), e.kind(), e.identifier().map(TaskId::as_str)))
            .collect();
        assert_eq!(
            tail,
            vec![
                (Category::Task, Kind::Stop, Some("A")),
                (Category::Task, Kind::Stop, Some("B")),
                (Category::Session, Kind::Stop, None),
            ]
        );

        let lines = fs::read_to_string(temp.path().join("worklog.log")).unwrap();
        assert!(lines.lines().last().unwrap().ends_with("|session|stop|"));
        assert!(store.log().active_task_ids(now.date_naive()).is_empty());
    }

    #[test]
    fn forced_session_stop_applies_offset_to_task_stops() {
        let (_temp, mut store) = open_temp();
        let start = at("2024-01-15T09:00:00+01:00");
        for id in ["A", "B"] {
            store
                .commit_at(
                    &CommitRequest::new(Category::Task, Kind::Start, Some(task(id))),
                    &start,
                )
                .unwrap();
        }

        let request = CommitRequest {
            force: true,
            offset_minutes: -30,
            ..CommitRequest::new(Category::Session, Kind::Stop, None)
        };
        let session_stop = store
            .commit_at(&request, &at("2024-01-15T17:00:00+01:00"))
            .unwrap();
        assert_eq!(session_stop.log_time(), at("2024-01-15T16:30:00+01:00"));

        let stops: Vec<_> = store
            .log()
            .events()
            .iter()
            .filter(|e| e.kind() == Kind::Stop)
            .collect();
        assert_eq!(stops.len(), 3);
        for stop in stops {
            assert_eq!(stop.log_time(), session_stop.log_time());
            assert_eq!(stop.commit_time(), at("2024-01-15T17:00:00+01:00"));
        }
    }

    #[test]
    fn tasks_on_other_days_do_not_block() {
        let (_temp, mut store) = open_temp();
        store
            .append(Event::task(
                task("A"),
                Kind::Start,
                at("2024-01-14T10:00:00+01:00"),
            ))
            .unwrap();

        let now = at("2024-01-15T17:00:00+01:00");
        let result =
            store.commit_at(&CommitRequest::new(Category::Session, Kind::Stop, None), &now);
        assert!(result.is_ok());
    }

    #[test]
    fn invalid_requests_write_nothing() {
        let (temp, mut store) = open_temp();
        let now = at("2024-01-15T17:00:00+01:00");

        let missing_id =
            store.commit_at(&CommitRequest::new(Category::Task, Kind::Start, None), &now);
        assert!(matches!(missing_id, Err(StoreError::Invalid(_))));

        let bad_time = CommitRequest {
            time: Some("noon".to_string()),
            ..CommitRequest::new(Category::Session, Kind::Start, None)
        };
        assert!(matches!(
            store.commit_at(&bad_time, &now),
            Err(StoreError::Time(_))
        ));

        let piped = CommitRequest::new(Category::Task, Kind::Start, Some(task("a|b")));
        assert!(matches!(
            store.commit_at(&piped, &now),
            Err(StoreError::SeparatorInIdentifier { .. })
        ));

        assert!(store.log().is_empty());
        assert_eq!(fs::read_to_string(temp.path().join("worklog.log")).unwrap(), "");
    }

    #[test]
    fn active_tasks_error_message() {
        let err = StoreError::ActiveTasks(vec![task("A")]);
        assert_eq!(err.to_string(), "task A is still active");
        let err = StoreError::ActiveTasks(vec![task("A"), task("B")]);
        assert_eq!(err.to_string(), "tasks A, B are still active");
    }

    #[test]
    fn rejects_unusable_separator() {
        let temp = tempfile::tempdir().unwrap();
        let err = Store::open(&temp.path().join("worklog.log"), 'x').unwrap_err();
        assert!(matches!(err, StoreError::InvalidSeparator('x')));
    }
}
