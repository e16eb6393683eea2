//! Done and skip command implementations.
//!
//! Recurring tasks are toggled per instance; the task's own status is left
//! alone. One-off tasks flip between the registry's first completed status
//! and the default open status.

use chrono::NaiveDate;
use taskview_core::lookups::find_task;
use taskview_core::{toggle_instance_completion, toggle_instance_skipped};
use taskview_model::date::format_date_for_storage;
use taskview_model::models::{StatusRegistry, TaskRecord, DEFAULT_STATUS};

use super::query::parse_day_or_today;
use super::status::describe;
use super::workspace::Workspace;
use super::{CommandContext, CommandError, Result};
use crate::output::{format_instance, format_instance_json};

/// Which mark to toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleKind {
    Done,
    Skip,
}

/// Toggles a one-off task between done and open.
///
/// Marking done records `date` as the completion date.
pub fn toggle_one_off(task: &TaskRecord, date: NaiveDate, statuses: &StatusRegistry) -> TaskRecord {
    let mut updated = task.clone();
    if statuses.is_completed(&task.status) {
        updated.status = DEFAULT_STATUS.to_string();
        updated.completed_date = None;
    } else if let Some(done) = statuses.first_completed() {
        updated.status = done.value.clone();
        updated.completed_date = Some(format_date_for_storage(date));
    }
    updated
}

/// Returns `task` with the requested mark toggled on `date`.
pub fn apply_toggle(
    task: &TaskRecord,
    date: NaiveDate,
    kind: ToggleKind,
    statuses: &StatusRegistry,
) -> Result<TaskRecord> {
    match (kind, task.is_recurring()) {
        (ToggleKind::Done, true) => Ok(toggle_instance_completion(task, date)),
        (ToggleKind::Done, false) => Ok(toggle_one_off(task, date, statuses)),
        (ToggleKind::Skip, true) => Ok(toggle_instance_skipped(task, date)),
        (ToggleKind::Skip, false) => Err(CommandError::NotRecurring(task.title.clone())),
    }
}

/// Executes the done or skip command and writes the task file.
///
/// # Errors
///
/// Returns an error if the task cannot be found, the date is invalid, a
/// one-off task is skipped or the task file cannot be written.
pub async fn execute(
    ctx: &CommandContext,
    workspace: &mut Workspace,
    task: &str,
    date: Option<&str>,
    kind: ToggleKind,
) -> Result<()> {
    let date = parse_day_or_today(date, ctx.today)?;
    let statuses = workspace.status_registry();

    let current = find_task(&workspace.snapshot().tasks, task)?;
    let updated = apply_toggle(current, date, kind, &statuses)?;
    tracing::debug!(path = %updated.path, ?kind, %date, "toggled task");

    workspace.snapshot_mut().replace_task(updated.clone());
    workspace.save().await?;

    let output = describe(&updated, date, &statuses)?;
    if ctx.json_output {
        println!("{}", format_instance_json(&output)?);
    } else if !ctx.quiet {
        println!("{}", format_instance(&output, ctx.use_colors));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::config::Config;
    use taskview_core::{effective_status, EffectiveStatus, TaskSnapshot, TaskStore};
    use tempfile::tempdir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily() -> TaskRecord {
        let mut task = TaskRecord::new("Tasks/daily.md", "Daily review");
        task.recurrence = Some("FREQ=DAILY".to_string());
        task.scheduled = Some("2025-03-01".to_string());
        task
    }

    #[test]
    fn test_toggle_one_off_roundtrip() {
        let statuses = StatusRegistry::default();
        let task = TaskRecord::new("Tasks/a.md", "A");

        let done = toggle_one_off(&task, ymd(2025, 3, 10), &statuses);
        assert_eq!(done.status, "done");
        assert_eq!(done.completed_date.as_deref(), Some("2025-03-10"));

        let reopened = toggle_one_off(&done, ymd(2025, 3, 11), &statuses);
        assert_eq!(reopened.status, DEFAULT_STATUS);
        assert!(reopened.completed_date.is_none());
    }

    #[test]
    fn test_toggle_one_off_without_completed_status() {
        let statuses = StatusRegistry::new(Vec::new());
        let task = TaskRecord::new("Tasks/a.md", "A");
        assert_eq!(toggle_one_off(&task, ymd(2025, 3, 10), &statuses), task);
    }

    #[test]
    fn test_apply_toggle_recurring_keeps_status() {
        let statuses = StatusRegistry::default();
        let task = daily();

        let done = apply_toggle(&task, ymd(2025, 3, 10), ToggleKind::Done, &statuses).unwrap();
        assert_eq!(done.status, task.status);
        assert_eq!(effective_status(&done, ymd(2025, 3, 10), &statuses), EffectiveStatus::Completed);
        assert_eq!(effective_status(&done, ymd(2025, 3, 11), &statuses), EffectiveStatus::Open);

        let skipped = apply_toggle(&done, ymd(2025, 3, 10), ToggleKind::Skip, &statuses).unwrap();
        assert_eq!(effective_status(&skipped, ymd(2025, 3, 10), &statuses), EffectiveStatus::Skipped);
        assert!(skipped.complete_instances.is_empty());
    }

    #[test]
    fn test_skip_one_off_errors() {
        let task = TaskRecord::new("Tasks/a.md", "A");
        let result = apply_toggle(&task, ymd(2025, 3, 10), ToggleKind::Skip, &StatusRegistry::default());
        assert!(matches!(result, Err(CommandError::NotRecurring(title)) if title == "A"));
    }

    #[tokio::test]
    async fn test_execute_writes_task_file() {
        let temp_dir = tempdir().unwrap();
        let store = TaskStore::with_path(temp_dir.path().join("tasks.json"));
        let mut snapshot = TaskSnapshot::new();
        snapshot.tasks.push(daily());
        store.save(&snapshot).unwrap();

        let config = Config::default();
        let mut workspace = Workspace::open(store.clone(), &config).await.unwrap();
        let ctx = CommandContext {
            json_output: false,
            use_colors: false,
            quiet: true,
            verbose: false,
            today: ymd(2025, 3, 10),
        };

        execute(&ctx, &mut workspace, "daily review", None, ToggleKind::Done)
            .await
            .unwrap();

        let saved = store.load().unwrap();
        assert_eq!(saved.tasks[0].complete_instances, vec!["2025-03-10".to_string()]);
        assert!(saved.updated_at.is_some());
    }
}
