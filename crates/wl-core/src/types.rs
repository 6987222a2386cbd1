//! Core type definitions with validation.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The value contains a line break and cannot be stored on one line.
    #[error("{field} cannot contain line breaks")]
    LineBreak { field: &'static str },

    /// A task event was created without an identifier.
    #[error("task events require an identifier")]
    MissingIdentifier,

    /// A session event was created with an identifier.
    #[error("session events cannot carry an identifier (got {value})")]
    UnexpectedIdentifier { value: String },

    /// Unknown event category string.
    #[error("unknown category: {value}")]
    UnknownCategory { value: String },

    /// Unknown event kind string.
    #[error("unknown kind: {value}")]
    UnknownKind { value: String },

    /// The working hour targets are not usable.
    #[error("invalid workday targets: hours_target={target}, hours_max={max}")]
    InvalidTargets { target: f64, max: f64 },
}

/// A validated task identifier.
///
/// Task identifiers must be non-empty single-line strings. They name a
/// sub-activity and are compared by exact string value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "task ID" });
        }
        if id.contains(['\n', '\r']) {
            return Err(ValidationError::LineBreak { field: "task ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Daily working hour targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkdayTargets {
    /// Time after which the day counts as complete.
    pub hours_target: Duration,
    /// Upper bound used to scale the overtime percentage.
    pub hours_max: Duration,
}

impl WorkdayTargets {
    /// Builds targets from fractional hours.
    ///
    /// The target must be positive and strictly below the maximum, otherwise
    /// the percentage calculations divide by zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_hours(target: f64, max: f64) -> Result<Self, ValidationError> {
        if !(target.is_finite() && max.is_finite()) || target <= 0.0 || max <= target {
            return Err(ValidationError::InvalidTargets { target, max });
        }
        Ok(Self {
            hours_target: Duration::seconds((target * 3600.0).round() as i64),
            hours_max: Duration::seconds((max * 3600.0).round() as i64),
        })
    }
}
