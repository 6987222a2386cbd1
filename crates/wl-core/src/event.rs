//! Start/stop events, the only thing the work log stores.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{TaskId, ValidationError};

/// What an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// The umbrella work day.
    Session,
    /// A named sub-activity within a session.
    Task,
}

impl Category {
    /// String representation used on disk and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" => Ok(Self::Session),
            "task" => Ok(Self::Task),
            _ => Err(ValidationError::UnknownCategory {
                value: s.to_string(),
            }),
        }
    }
}

/// Whether an event opens or closes an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Start,
    Stop,
}

impl Kind {
    /// String representation used on disk and on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            _ => Err(ValidationError::UnknownKind {
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! string_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(Category);
string_serde!(Kind);

/// A single start or stop record.
///
/// Events are immutable once built. `log_time` is the moment the event
/// stands for; `commit_time` is when it was written, which differs whenever
/// an offset or an explicit time was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    commit_time: DateTime<FixedOffset>,
    log_time: DateTime<FixedOffset>,
    category: Category,
    kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<TaskId>,
}

impl Event {
    /// Builds an event, enforcing that only task events carry an identifier.
    pub fn new(
        commit_time: DateTime<FixedOffset>,
        log_time: DateTime<FixedOffset>,
        category: Category,
        kind: Kind,
        identifier: Option<TaskId>,
    ) -> Result<Self, ValidationError> {
        match (category, &identifier) {
            (Category::Task, None) => return Err(ValidationError::MissingIdentifier),
            (Category::Session, Some(id)) => {
                return Err(ValidationError::UnexpectedIdentifier {
                    value: id.to_string(),
                });
            }
            _ => {}
        }
        Ok(Self {
            commit_time,
            log_time,
            category,
            kind,
            identifier,
        })
    }

    /// Shorthand for a session event committed at its log time.
    pub fn session(kind: Kind, at: DateTime<FixedOffset>) -> Self {
        Self {
            commit_time: at,
            log_time: at,
            category: Category::Session,
            kind,
            identifier: None,
        }
    }

    /// Shorthand for a task event committed at its log time.
    pub fn task(id: TaskId, kind: Kind, at: DateTime<FixedOffset>) -> Self {
        Self {
            commit_time: at,
            log_time: at,
            category: Category::Task,
            kind,
            identifier: Some(id),
        }
    }

    pub const fn commit_time(&self) -> DateTime<FixedOffset> {
        self.commit_time
    }

    pub const fn log_time(&self) -> DateTime<FixedOffset> {
        self.log_time
    }

    pub const fn category(&self) -> Category {
        self.category
    }

    pub const fn kind(&self) -> Kind {
        self.kind
    }

    pub const fn identifier(&self) -> Option<&TaskId> {
        self.identifier.as_ref()
    }

    /// Calendar date of `log_time` in the offset it was recorded with.
    pub fn date(&self) -> NaiveDate {
        self.log_time.date_naive()
    }

    /// A copy of this event's partition key.
    pub fn partition(&self) -> Partition {
        Partition {
            category: self.category,
            identifier: self.identifier.clone(),
        }
    }

    /// Whether the event belongs to the given partition.
    pub fn in_partition(&self, partition: &Partition) -> bool {
        self.category == partition.category && self.identifier == partition.identifier
    }
}

/// The `(category, identifier)` pair within which start/stop must alternate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition {
    pub category: Category,
    pub identifier: Option<TaskId>,
}

impl Partition {
    pub const fn session() -> Self {
        Self {
            category: Category::Session,
            identifier: None,
        }
    }

    pub const fn task(id: TaskId) -> Self {
        Self {
            category: Category::Task,
            identifier: Some(id),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identifier {
            Some(id) => write!(f, "{} \"{id}\"", self.category),
            None => write!(f, "{}", self.category),
        }
    }
}
