//! The in-memory work log: every event, ordered by log time.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::event::{Category, Event, Kind, Partition};
use crate::types::TaskId;

/// Ordered sequence of events.
///
/// Events are kept sorted by `log_time`. Events with equal `log_time` keep
/// the order in which they were inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Log {
    events: Vec<Event>,
}

impl Log {
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Builds a log from events in insertion order.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut events: Vec<Event> = events.into_iter().collect();
        // Stable sort keeps insertion order for ties.
        events.sort_by_key(Event::log_time);
        Self { events }
    }

    /// Inserts an event after every event with an equal or earlier log time.
    pub fn insert(&mut self, event: Event) {
        let pos = self
            .events
            .partition_point(|e| e.log_time() <= event.log_time());
        self.events.insert(pos, event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events whose log time falls on `date`.
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| e.date() == date)
    }

    /// Events of one partition, in order.
    pub fn in_partition<'a>(
        &'a self,
        partition: &'a Partition,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.in_partition(partition))
    }

    /// Groups events by date, then by partition, preserving order inside each group.
    pub fn by_date_and_partition(&self) -> BTreeMap<NaiveDate, BTreeMap<Partition, Vec<&Event>>> {
        let mut groups: BTreeMap<NaiveDate, BTreeMap<Partition, Vec<&Event>>> = BTreeMap::new();
        for event in &self.events {
            groups
                .entry(event.date())
                .or_default()
                .entry(event.partition())
                .or_default()
                .push(event);
        }
        groups
    }

    /// Every task identifier that appears anywhere in the log.
    pub fn task_ids(&self) -> BTreeSet<&TaskId> {
        self.events.iter().filter_map(Event::identifier).collect()
    }

    /// Tasks whose most recent event on `date` is a start, sorted ascending.
    pub fn active_task_ids(&self, date: NaiveDate) -> Vec<TaskId> {
        let mut last_kind: BTreeMap<&TaskId, Kind> = BTreeMap::new();
        for event in self.on_date(date) {
            if event.category() != Category::Task {
                continue;
            }
            if let Some(id) = event.identifier() {
                last_kind.insert(id, event.kind());
            }
        }
        last_kind
            .into_iter()
            .filter(|(_, kind)| *kind == Kind::Start)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// The `n` most recent events, newest first, optionally restricted to one category.
    ///
    /// `None` returns every matching event.
    pub fn recent(&self, n: Option<usize>, category: Option<Category>) -> Vec<&Event> {
        let matching = self
            .events
            .iter()
            .rev()
            .filter(|e| category.is_none_or(|c| e.category() == c));
        match n {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        }
    }
}
