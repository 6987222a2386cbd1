//! Virtual "now" stop events for intervals that are still open.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveTime, TimeZone};
use thiserror::Error;

use crate::event::{Event, Kind};

const LAST_SECOND: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(t) => t,
    None => panic!("invalid time of day"),
};

/// The queried date lies after today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{date} is in the future; only today or past dates are supported")]
pub struct FutureDateError {
    pub date: NaiveDate,
}

/// Returns the moment an open interval on `query_date` should be closed at.
///
/// This is `now` when `query_date` is today and 23:59:59 on `query_date` in
/// `zone` for past dates. `zone` is the time zone the day was recorded in, so
/// a day on the other side of a DST change ends at its own local midnight.
pub fn sentinel_datetime<Tz: TimeZone, Z: TimeZone>(
    now: &DateTime<Tz>,
    query_date: NaiveDate,
    zone: &Z,
) -> Result<DateTime<FixedOffset>, FutureDateError> {
    let today = now.date_naive();
    if query_date > today {
        return Err(FutureDateError { date: query_date });
    }
    let now = now.fixed_offset();
    if query_date == today {
        return Ok(now);
    }
    let last_second = query_date.and_time(LAST_SECOND);
    let end_of_day = match zone.from_local_datetime(&last_second) {
        // Ambiguous (DST fall-back): take the later reading, it is still on query_date
        LocalResult::Single(dt) | LocalResult::Ambiguous(_, dt) => dt.fixed_offset(),
        // 23:59:59 skipped by a DST jump: fall back to the clock's current offset
        LocalResult::None => now
            .offset()
            .from_local_datetime(&last_second)
            .single()
            .unwrap_or(now),
    };
    Ok(now.min(end_of_day))
}

/// Synthesizes a stop event when the last event of a partition is a start.
///
/// `events` is the partition's subsequence for `query_date`, in log-time
/// order. Returns `Ok(None)` when the partition is closed. On past dates the
/// stop lands on 23:59:59 in the offset the open start was recorded with.
pub fn sentinel_stop<'a, Tz: TimeZone>(
    events: impl IntoIterator<Item = &'a Event>,
    now: &DateTime<Tz>,
    query_date: NaiveDate,
) -> Result<Option<Event>, FutureDateError> {
    let Some(last) = events.into_iter().last() else {
        return Ok(None);
    };
    if last.kind() != Kind::Start {
        return Ok(None);
    }
    let at = sentinel_datetime(now, query_date, &last.log_time().timezone())?;
    tracing::debug!(%at, "set sentinel stop value");
    let sentinel = match last.identifier() {
        Some(id) => Event::task(id.clone(), Kind::Stop, at),
        None => Event::session(Kind::Stop, at),
    };
    Ok(Some(sentinel))
}

/// Whether the last of the given events is a start.
pub fn is_active<'a>(events: impl IntoIterator<Item = &'a Event>) -> bool {
    events
        .into_iter()
        .last()
        .is_some_and(|e| e.kind() == Kind::Start)
}
