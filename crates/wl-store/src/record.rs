//! Line encoding of events.
//!
//! One event per line, five fields in fixed order:
//!
//! ```text
//! commit_time|log_time|category|kind|identifier
//! 2024-01-15T09:00:12+01:00|2024-01-15T09:00:00+01:00|session|start|
//! ```
//!
//! Timestamps are RFC 3339 with offset at second precision. The identifier
//! is empty for session events.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use thiserror::Error;

use wl_core::{Category, Event, Kind, TaskId, ValidationError};

const FIELD_COUNT: usize = 5;

/// Why a stored line could not be turned back into an event.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected {FIELD_COUNT} fields, found {0}")]
    FieldCount(usize),

    #[error("invalid {field} timestamp {value:?}")]
    Timestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

fn format_time(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn parse_time(field: &'static str, value: &str) -> Result<DateTime<FixedOffset>, RecordError> {
    DateTime::parse_from_rfc3339(value).map_err(|source| RecordError::Timestamp {
        field,
        value: value.to_string(),
        source,
    })
}

/// Encodes an event as one line, without the trailing newline.
pub fn encode(event: &Event, separator: char) -> String {
    let identifier = event.identifier().map(TaskId::as_str).unwrap_or_default();
    [
        format_time(&event.commit_time()),
        format_time(&event.log_time()),
        event.category().to_string(),
        event.kind().to_string(),
        identifier.to_string(),
    ]
    .join(&separator.to_string())
}

/// Decodes one stored line.
pub fn decode(line: &str, separator: char) -> Result<Event, RecordError> {
    let fields: Vec<&str> = line.split(separator).collect();
    let [commit_time, log_time, category, kind, identifier] = fields[..] else {
        return Err(RecordError::FieldCount(fields.len()));
    };

    let identifier = if identifier.is_empty() {
        None
    } else {
        Some(TaskId::new(identifier)?)
    };

    Ok(Event::new(
        parse_time("commit", commit_time)?,
        parse_time("log", log_time)?,
        category.parse::<Category>()?,
        kind.parse::<Kind>()?,
        identifier,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn encodes_session_with_empty_identifier() {
        let event = Event::new(
            at("2024-01-15T09:00:12+01:00"),
            at("2024-01-15T09:00:00+01:00"),
            Category::Session,
            Kind::Start,
            None,
        )
        .unwrap();

        assert_eq!(
            encode(&event, '|'),
            "2024-01-15T09:00:12+01:00|2024-01-15T09:00:00+01:00|session|start|"
        );
    }

    #[test]
    fn decodes_task_line() {
        let event = decode(
            "2024-01-15T09:00:12+01:00|2024-01-15T09:00:00+01:00|task|stop|review",
            '|',
        )
        .unwrap();

        assert_eq!(event.category(), Category::Task);
        assert_eq!(event.kind(), Kind::Stop);
        assert_eq!(event.identifier().map(TaskId::as_str), Some("review"));
        assert_eq!(event.commit_time(), at("2024-01-15T09:00:12+01:00"));
    }

    #[test]
    fn honours_custom_separator() {
        let event = Event::task(
            TaskId::new("a|b").unwrap(),
            Kind::Start,
            at("2024-01-15T09:00:00Z"),
        );
        let line = encode(&event, ';');
        assert_eq!(
            line,
            "2024-01-15T09:00:00+00:00;2024-01-15T09:00:00+00:00;task;start;a|b"
        );
        assert_eq!(decode(&line, ';').unwrap(), event);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = decode("2024-01-15T09:00:00+01:00|session|start", '|').unwrap_err();
        assert!(matches!(err, RecordError::FieldCount(3)));
    }

    #[test]
    fn rejects_bad_timestamp() {
        let err = decode("yesterday|2024-01-15T09:00:00+01:00|session|start|", '|').unwrap_err();
        assert_eq!(err.to_string(), "invalid commit timestamp \"yesterday\"");
    }

    #[test]
    fn rejects_unknown_category_and_missing_task_id() {
        let err = decode(
            "2024-01-15T09:00:00+01:00|2024-01-15T09:00:00+01:00|start_stop|start|",
            '|',
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Invalid(_)));

        let err = decode(
            "2024-01-15T09:00:00+01:00|2024-01-15T09:00:00+01:00|task|start|",
            '|',
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RecordError::Invalid(ValidationError::MissingIdentifier)
        ));
    }
}
