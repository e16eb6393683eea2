//! Filtering, recurrence and agenda logic for taskview.
//!
//! This crate evaluates structured filter queries over task records, tracks
//! per-day state of recurring tasks and partitions tasks into agenda days.
//! Everything works on an in-memory [`TaskSnapshot`], which [`TaskStore`]
//! persists as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskview_model::models::{
    PriorityConfig, PriorityRegistry, StatusConfig, StatusRegistry, TaskRecord,
    UserFieldDefinition,
};

pub mod agenda;
pub mod filter;
pub mod lookups;
pub mod recurrence;
mod store;
pub mod views;

pub use agenda::{agenda_dates, get_agenda_data, AgendaBucket, AgendaData};
pub use filter::{FilterContext, FilterEvaluator, FilterOptions, FilterQuery};
pub use lookups::{LookupError, LookupResult};
pub use recurrence::{
    effective_status, toggle_instance_completion, toggle_instance_skipped, EffectiveStatus,
    RRuleExpander, RecurrenceExpander,
};
pub use store::{StoreError, StoreResult, TaskStore};
pub use views::{active_view, queries_match, SavedView, SavedViews};

/// Read access to task records by path.
///
/// The core only reads tasks; whatever owns them (a vault index, a file on
/// disk, a test fixture) implements this.
pub trait TaskSource {
    /// Paths of all known tasks, in source order.
    fn task_paths(&self) -> Vec<&str>;

    /// The task stored under `path`.
    fn task_info(&self, path: &str) -> Option<&TaskRecord>;
}

/// Snapshot of everything the core works on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,

    /// Saved views in creation order.
    #[serde(default)]
    pub saved_views: SavedViews,

    #[serde(default)]
    pub user_fields: Vec<UserFieldDefinition>,

    /// Status list overriding the built-in defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<StatusConfig>>,

    /// Priority list overriding the built-in defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priorities: Option<Vec<PriorityConfig>>,

    /// UTC timestamp of the last write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no tasks and no saved views.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.saved_views.is_empty()
    }

    /// Status registry for this snapshot, falling back to the defaults.
    pub fn status_registry(&self) -> StatusRegistry {
        match &self.statuses {
            Some(statuses) if !statuses.is_empty() => StatusRegistry::new(statuses.clone()),
            _ => StatusRegistry::default(),
        }
    }

    /// Priority registry for this snapshot, falling back to the defaults.
    pub fn priority_registry(&self) -> PriorityRegistry {
        match &self.priorities {
            Some(priorities) if !priorities.is_empty() => PriorityRegistry::new(priorities.clone()),
            _ => PriorityRegistry::default(),
        }
    }

    /// Replaces the task with the same path. Returns false if there is none.
    pub fn replace_task(&mut self, task: TaskRecord) -> bool {
        match self.tasks.iter_mut().find(|t| t.path == task.path) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Stamps the snapshot as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

impl TaskSource for TaskSnapshot {
    fn task_paths(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.path.as_str()).collect()
    }

    fn task_info(&self, path: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.path == path)
    }
}
