//! Prelude module for convenient imports.
//!
//! ```
//! use taskview_model::prelude::*;
//!
//! let task = TaskRecord::new("Tasks/a.md", "A");
//! assert!(!StatusRegistry::default().is_completed(&task.status));
//! ```

pub use crate::date::{format_date_for_storage, parse_calendar_date, today};
pub use crate::models::{
    PriorityConfig, PriorityRegistry, RecurrenceAnchor, StatusConfig, StatusRegistry, TaskRecord,
    UserFieldDefinition, UserFieldKind,
};
