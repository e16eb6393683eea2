//! Per-day state of recurring tasks.
//!
//! A recurring task has no stored per-instance objects. The state of the
//! instance on a given day is recomputed from the task's
//! `complete_instances` and `skipped_instances` lists, and whether an
//! instance exists at all on that day is answered by a [`RecurrenceExpander`].
//!
//! ```
//! use chrono::NaiveDate;
//! use taskview_core::recurrence::{effective_status, toggle_instance_completion, EffectiveStatus};
//! use taskview_model::models::{StatusRegistry, TaskRecord};
//!
//! let mut task = TaskRecord::new("Tasks/stretch.md", "Stretch");
//! task.recurrence = Some("FREQ=DAILY".to_string());
//! task.scheduled = Some("2025-03-01".to_string());
//!
//! let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
//! let statuses = StatusRegistry::default();
//! let done = toggle_instance_completion(&task, day);
//! assert_eq!(effective_status(&done, day, &statuses), EffectiveStatus::Completed);
//! assert_eq!(effective_status(&task, day, &statuses), EffectiveStatus::Open);
//! ```

mod error;
mod rule;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskview_model::date::{add_days, format_date_for_storage};
use taskview_model::models::{RecurrenceAnchor, StatusRegistry, TaskRecord};

pub use error::{RecurrenceError, RecurrenceResult};
pub use rule::{Frequency, RecurrenceRule, WeekdaySpec, SEARCH_HORIZON_DAYS};

/// Evaluates recurrence rule strings.
///
/// The agenda and effective-status code only ever ask two questions of a
/// rule, so alternative rule engines can be plugged in by implementing
/// [`occurs_on`](RecurrenceExpander::occurs_on).
pub trait RecurrenceExpander {
    /// Returns true if the series described by `rule`, starting on `start`,
    /// has an instance on `date`.
    fn occurs_on(&self, rule: &str, start: NaiveDate, date: NaiveDate) -> RecurrenceResult<bool>;

    /// Returns the first instance on or after `from`.
    fn next_occurrence(
        &self,
        rule: &str,
        start: NaiveDate,
        from: NaiveDate,
    ) -> RecurrenceResult<Option<NaiveDate>> {
        let begin = from.max(start);
        for day in begin.iter_days().take(SEARCH_HORIZON_DAYS as usize) {
            if self.occurs_on(rule, start, day)? {
                return Ok(Some(day));
            }
        }
        Ok(None)
    }

    /// Returns the series start embedded in the rule, if the rule format has one.
    fn rule_start(&self, _rule: &str) -> Option<NaiveDate> {
        None
    }
}

/// Built-in expander for the supported iCalendar `RRULE` subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RRuleExpander;

impl RecurrenceExpander for RRuleExpander {
    fn occurs_on(&self, rule: &str, start: NaiveDate, date: NaiveDate) -> RecurrenceResult<bool> {
        Ok(RecurrenceRule::parse(rule)?.occurs_on(start, date))
    }

    fn next_occurrence(
        &self,
        rule: &str,
        start: NaiveDate,
        from: NaiveDate,
    ) -> RecurrenceResult<Option<NaiveDate>> {
        Ok(RecurrenceRule::parse(rule)?.next_on_or_after(start, from))
    }

    fn rule_start(&self, rule: &str) -> Option<NaiveDate> {
        RecurrenceRule::parse(rule).ok().and_then(|r| r.dtstart)
    }
}

/// Displayable state of a task on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Open,
    Completed,
    Skipped,
}

impl EffectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveStatus::Open => "open",
            EffectiveStatus::Completed => "completed",
            EffectiveStatus::Skipped => "skipped",
        }
    }
}

/// Returns the state of `task` on `date`.
///
/// Recurring tasks read their instance lists; a day listed as both completed
/// and skipped counts as completed. One-off tasks use their status field.
pub fn effective_status(task: &TaskRecord, date: NaiveDate, statuses: &StatusRegistry) -> EffectiveStatus {
    if !task.is_recurring() {
        return if statuses.is_completed(&task.status) {
            EffectiveStatus::Completed
        } else {
            EffectiveStatus::Open
        };
    }

    if task.is_instance_completed(date) {
        EffectiveStatus::Completed
    } else if task.is_instance_skipped(date) {
        EffectiveStatus::Skipped
    } else {
        EffectiveStatus::Open
    }
}

/// Flips the completion mark of the instance on `date`.
///
/// Marking an instance complete clears any skip mark for the same day.
/// Toggling twice from an open day returns an equal task.
pub fn toggle_instance_completion(task: &TaskRecord, date: NaiveDate) -> TaskRecord {
    let key = format_date_for_storage(date);
    let mut updated = task.clone();

    if task.is_instance_completed(date) {
        updated.complete_instances.retain(|d| *d != key);
    } else {
        updated.skipped_instances.retain(|d| *d != key);
        updated.complete_instances.push(key);
    }
    updated
}

/// Flips the skip mark of the instance on `date`.
///
/// Skipping an instance clears any completion mark for the same day.
pub fn toggle_instance_skipped(task: &TaskRecord, date: NaiveDate) -> TaskRecord {
    let key = format_date_for_storage(date);
    let mut updated = task.clone();

    if task.is_instance_skipped(date) {
        updated.skipped_instances.retain(|d| *d != key);
    } else {
        updated.complete_instances.retain(|d| *d != key);
        updated.skipped_instances.push(key);
    }
    updated
}

/// Returns the first day of a recurring task's series.
///
/// The rule's own start wins, then `scheduled`, `due` and `date_created`.
pub fn series_start(task: &TaskRecord, expander: &dyn RecurrenceExpander) -> Option<NaiveDate> {
    task.recurrence
        .as_deref()
        .and_then(|rule| expander.rule_start(rule))
        .or_else(|| task.scheduled_date())
        .or_else(|| task.due_date())
        .or_else(|| task.created_date())
}

/// Start the series is counted from when asking about `date`.
///
/// With the completion anchor, days after the latest completed instance are
/// counted from that completion rather than from the series start.
fn anchored_start(task: &TaskRecord, start: NaiveDate, date: NaiveDate) -> NaiveDate {
    if task.recurrence_anchor != RecurrenceAnchor::Completion {
        return start;
    }
    match task.latest_completed_instance() {
        Some(latest) if latest >= start && date > latest => latest,
        _ => start,
    }
}

/// Returns true if the task has an instance on `date`.
///
/// One-off tasks and recurring tasks without a resolvable start never do.
pub fn try_is_instance_on(
    task: &TaskRecord,
    date: NaiveDate,
    expander: &dyn RecurrenceExpander,
) -> RecurrenceResult<bool> {
    let Some(rule) = task.recurrence.as_deref().filter(|_| task.is_recurring()) else {
        return Ok(false);
    };
    let Some(start) = series_start(task, expander) else {
        return Ok(false);
    };

    expander.occurs_on(rule, anchored_start(task, start, date), date)
}

/// Like [`try_is_instance_on`], logging and returning false for bad rules.
pub fn is_instance_on(task: &TaskRecord, date: NaiveDate, expander: &dyn RecurrenceExpander) -> bool {
    match try_is_instance_on(task, date, expander) {
        Ok(occurs) => occurs,
        Err(err) => {
            tracing::warn!(path = %task.path, error = %err, "ignoring unparseable recurrence rule");
            false
        }
    }
}

/// Returns the first instance of the task on or after `from`, per its anchor.
pub fn instance_date_on_or_after(
    task: &TaskRecord,
    from: NaiveDate,
    expander: &dyn RecurrenceExpander,
) -> RecurrenceResult<Option<NaiveDate>> {
    let Some(rule) = task.recurrence.as_deref().filter(|_| task.is_recurring()) else {
        return Ok(None);
    };
    let Some(start) = series_start(task, expander) else {
        return Ok(None);
    };

    if task.recurrence_anchor == RecurrenceAnchor::Completion {
        if let Some(latest) = task.latest_completed_instance().filter(|l| *l >= start) {
            // Occurrences restart after the latest completion, exclusive.
            let after = add_days(latest, 1).max(from);
            return expander.next_occurrence(rule, latest, after);
        }
    }
    expander.next_occurrence(rule, start, from)
}
