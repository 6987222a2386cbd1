//! Resolving the log time of a commit from the clock, an offset, or an explicit time.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound,
    TimeZone, Timelike,
};
use thiserror::Error;

/// Errors while interpreting an explicit `--time` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeSpecError {
    /// Neither `HH:MM` nor an ISO 8601 timestamp.
    #[error("invalid time {value:?}: expected HH:MM or an ISO 8601 timestamp")]
    Unparsable { value: String },

    /// The local time does not exist (skipped by a DST change).
    #[error("time {value:?} does not exist in the local time zone")]
    Nonexistent { value: String },

    /// Offset pushes the time outside the supported range.
    #[error("offset of {minutes} minutes is out of range")]
    OffsetOutOfRange { minutes: i64 },
}

/// ISO 8601 forms with an offset that RFC 3339 parsing rejects.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// ISO 8601 forms without an offset; `%.f` also accepts no fraction.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Truncates a timestamp to whole seconds.
pub fn truncate_to_seconds<Tz: TimeZone>(dt: DateTime<Tz>) -> DateTime<Tz> {
    dt.trunc_subsecs(0)
}

/// Computes the log time for a commit.
///
/// Starts from `now` (truncated to seconds) shifted by `offset_minutes`. An
/// explicit `time` then overrides it:
/// - `HH:MM` keeps the shifted date and sets the time of day, seconds `00`;
/// - an ISO 8601 timestamp replaces the value completely (seconds `00`), in
///   the local time zone when it carries no offset;
/// - a bare `YYYY-MM-DD` date means local midnight.
pub fn resolve_log_time<Tz: TimeZone>(
    now: &DateTime<Tz>,
    offset_minutes: i64,
    time: Option<&str>,
) -> Result<DateTime<FixedOffset>, TimeSpecError> {
    let offset = Duration::try_minutes(offset_minutes)
        .ok_or(TimeSpecError::OffsetOutOfRange { minutes: offset_minutes })?;
    let shifted = truncate_to_seconds(now.clone())
        .checked_add_signed(offset)
        .ok_or(TimeSpecError::OffsetOutOfRange { minutes: offset_minutes })?;

    let Some(value) = time else {
        return Ok(shifted.fixed_offset());
    };
    let value = value.trim();

    if let Ok(time_of_day) = NaiveTime::parse_from_str(value, "%H:%M") {
        let naive = shifted.date_naive().and_time(time_of_day);
        return in_zone(&now.timezone(), &naive, value);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(truncate_to_minutes(dt));
    }

    // A trailing `Z` stands for UTC.
    let with_offset = value
        .strip_suffix(['Z', 'z'])
        .map_or_else(|| value.to_string(), |v| format!("{v}+00:00"));
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
            return Ok(truncate_to_minutes(dt));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return in_zone(&now.timezone(), &naive, value).map(truncate_to_minutes);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return in_zone(&now.timezone(), &date.and_time(NaiveTime::MIN), value);
    }

    Err(TimeSpecError::Unparsable {
        value: value.to_string(),
    })
}

fn truncate_to_minutes(dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let dt = truncate_to_seconds(dt);
    let seconds = Duration::seconds(i64::from(dt.second()));
    dt - seconds
}

fn in_zone<Tz: TimeZone>(
    tz: &Tz,
    naive: &NaiveDateTime,
    value: &str,
) -> Result<DateTime<FixedOffset>, TimeSpecError> {
    match tz.from_local_datetime(naive) {
        // Ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.fixed_offset()),
        LocalResult::None => Err(TimeSpecError::Nonexistent {
            value: value.to_string(),
        }),
    }
}
