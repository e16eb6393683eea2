//! Task record model.
//!
//! A [`TaskRecord`] is the read-only snapshot of one task note as seen by the
//! filtering, recurrence and agenda code. Dates are kept as the strings they
//! were stored with; accessors parse them into calendar days on demand.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{format_date_for_storage, parse_calendar_date};

/// Default status assigned to tasks that do not carry one.
pub const DEFAULT_STATUS: &str = "open";

/// Default priority assigned to tasks that do not carry one.
pub const DEFAULT_PRIORITY: &str = "normal";

/// A task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique identifier (the note path).
    pub path: String,

    /// Task title.
    #[serde(default)]
    pub title: String,

    /// Status value, resolved through the status registry.
    #[serde(default = "default_status")]
    pub status: String,

    /// Priority value, resolved through the priority registry.
    #[serde(default = "default_priority")]
    pub priority: String,

    /// Due date (`YYYY-MM-DD`) or date-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,

    /// Scheduled date (`YYYY-MM-DD`) or date-time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,

    /// Recurrence rule. `None` for one-off tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,

    /// Which date a recurring task's current instance is keyed off.
    #[serde(default)]
    pub recurrence_anchor: RecurrenceAnchor,

    /// Days (`YYYY-MM-DD`) on which a recurring instance was completed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub complete_instances: Vec<String>,

    /// Days (`YYYY-MM-DD`) on which a recurring instance was skipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_instances: Vec<String>,

    /// Completion date of a one-off task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,

    /// Estimated effort in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<u32>,

    #[serde(default)]
    pub archived: bool,

    /// User-defined properties, keyed by frontmatter key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, serde_json::Value>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

/// Anchor policy for recurring tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceAnchor {
    /// Instances follow the scheduled date (or the rule's own start).
    #[default]
    Scheduled,
    /// Instances follow the most recent completion.
    Completion,
}

impl RecurrenceAnchor {
    /// Returns the wire name of the anchor.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceAnchor::Scheduled => "scheduled",
            RecurrenceAnchor::Completion => "completion",
        }
    }
}

impl TaskRecord {
    /// Creates a task with default status and priority and no dates.
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            status: default_status(),
            priority: default_priority(),
            due: None,
            scheduled: None,
            tags: Vec::new(),
            contexts: Vec::new(),
            projects: Vec::new(),
            recurrence: None,
            recurrence_anchor: RecurrenceAnchor::default(),
            complete_instances: Vec::new(),
            skipped_instances: Vec::new(),
            completed_date: None,
            date_created: None,
            date_modified: None,
            time_estimate: None,
            archived: false,
            custom: BTreeMap::new(),
        }
    }

    /// Returns true if the task carries a non-blank recurrence rule.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    /// Returns the due date as a calendar day, if set and valid.
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due.as_deref().and_then(parse_calendar_date)
    }

    /// Returns the scheduled date as a calendar day, if set and valid.
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled.as_deref().and_then(parse_calendar_date)
    }

    /// Returns the creation date as a calendar day, if set and valid.
    pub fn created_date(&self) -> Option<NaiveDate> {
        self.date_created.as_deref().and_then(parse_calendar_date)
    }

    /// Returns true if the instance on `date` is recorded as completed.
    pub fn is_instance_completed(&self, date: NaiveDate) -> bool {
        let key = format_date_for_storage(date);
        self.complete_instances.iter().any(|d| *d == key)
    }

    /// Returns true if the instance on `date` is recorded as skipped.
    pub fn is_instance_skipped(&self, date: NaiveDate) -> bool {
        let key = format_date_for_storage(date);
        self.skipped_instances.iter().any(|d| *d == key)
    }

    /// Returns the most recent completed instance, ignoring malformed entries.
    pub fn latest_completed_instance(&self) -> Option<NaiveDate> {
        self.complete_instances
            .iter()
            .filter_map(|d| parse_calendar_date(d))
            .max()
    }

    /// Looks up a user-defined property by frontmatter key.
    pub fn custom_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.custom.get(key)
    }
}
