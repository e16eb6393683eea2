//! Status, priority and user-field registries.
//!
//! Registries are ordered lists owned by the host configuration. Their order
//! is meaningful: it drives select-option order, grouping order and the
//! status sort key.

use serde::{Deserialize, Serialize};

/// One configured status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Value stored on the task.
    pub value: String,
    /// Display label.
    pub label: String,
    #[serde(default)]
    pub color: String,
    /// Whether tasks in this status count as done.
    #[serde(default)]
    pub is_completed: bool,
}

/// One configured priority value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Value stored on the task.
    pub value: String,
    /// Display label.
    pub label: String,
    #[serde(default)]
    pub color: String,
    /// Higher weight means more important.
    #[serde(default)]
    pub weight: u32,
}

impl StatusConfig {
    pub fn new(value: &str, label: &str, color: &str, is_completed: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            color: color.to_string(),
            is_completed,
        }
    }
}

impl PriorityConfig {
    pub fn new(value: &str, label: &str, color: &str, weight: u32) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            color: color.to_string(),
            weight,
        }
    }
}

/// Ordered status registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusRegistry {
    statuses: Vec<StatusConfig>,
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::new(vec![
            StatusConfig::new("none", "None", "#cccccc", false),
            StatusConfig::new("open", "Open", "#808080", false),
            StatusConfig::new("in-progress", "In progress", "#0066cc", false),
            StatusConfig::new("done", "Done", "#00aa00", true),
        ])
    }
}

impl StatusRegistry {
    pub fn new(statuses: Vec<StatusConfig>) -> Self {
        Self { statuses }
    }

    /// Returns the configured statuses in order.
    pub fn statuses(&self) -> &[StatusConfig] {
        &self.statuses
    }

    /// Finds a status by value (exact match).
    pub fn find(&self, value: &str) -> Option<&StatusConfig> {
        self.statuses.iter().find(|s| s.value == value)
    }

    /// Returns true if `value` is a completed status. Unknown values are not.
    pub fn is_completed(&self, value: &str) -> bool {
        self.find(value).is_some_and(|s| s.is_completed)
    }

    /// Returns the registry position of `value`.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.statuses.iter().position(|s| s.value == value)
    }

    /// Returns the first completed status, used when marking one-off tasks done.
    pub fn first_completed(&self) -> Option<&StatusConfig> {
        self.statuses.iter().find(|s| s.is_completed)
    }

    /// Returns the display label for `value`, falling back to the raw value.
    pub fn label<'a>(&'a self, value: &'a str) -> &'a str {
        self.find(value).map_or(value, |s| s.label.as_str())
    }
}

/// Ordered priority registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityRegistry {
    priorities: Vec<PriorityConfig>,
}

impl Default for PriorityRegistry {
    fn default() -> Self {
        Self::new(vec![
            PriorityConfig::new("none", "None", "#cccccc", 0),
            PriorityConfig::new("low", "Low", "#00aa00", 1),
            PriorityConfig::new("normal", "Normal", "#ffaa00", 2),
            PriorityConfig::new("high", "High", "#ff0000", 3),
        ])
    }
}

impl PriorityRegistry {
    pub fn new(priorities: Vec<PriorityConfig>) -> Self {
        Self { priorities }
    }

    pub fn priorities(&self) -> &[PriorityConfig] {
        &self.priorities
    }

    pub fn find(&self, value: &str) -> Option<&PriorityConfig> {
        self.priorities.iter().find(|p| p.value == value)
    }

    /// Returns the weight of `value`; unknown priorities weigh 0.
    pub fn weight(&self, value: &str) -> u32 {
        self.find(value).map_or(0, |p| p.weight)
    }

    pub fn label<'a>(&'a self, value: &'a str) -> &'a str {
        self.find(value).map_or(value, |p| p.label.as_str())
    }
}

/// Value kind of a user-defined field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserFieldKind {
    Text,
    Number,
    Date,
    Boolean,
    List,
}

/// Declaration of a user-defined task property.
///
/// Filters address the field as `user:<id>`; the value is read from the
/// task's custom storage under `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFieldDefinition {
    pub id: String,
    pub display_name: String,
    /// Frontmatter key the value is stored under.
    pub key: String,
    pub kind: UserFieldKind,
}
