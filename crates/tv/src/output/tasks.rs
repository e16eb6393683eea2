//! Task output formatting.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use serde::Serialize;
use taskview_core::filter::TaskGroup;
use taskview_core::EffectiveStatus;
use taskview_model::models::{PriorityRegistry, StatusRegistry, TaskRecord};

use super::helpers::{
    format_day, format_labels, format_priority, format_status, recurrence_marker, truncate_str,
};

/// Registries and display settings shared by the task formatters.
pub struct TaskStyle<'a> {
    pub statuses: &'a StatusRegistry,
    pub priorities: &'a PriorityRegistry,
    pub today: NaiveDate,
    pub use_colors: bool,
}

/// JSON output structure for a single task.
#[derive(Serialize)]
pub struct TaskOutput<'a> {
    pub path: &'a str,
    pub title: &'a str,
    pub status: &'a str,
    pub priority: &'a str,
    pub due: Option<&'a str>,
    pub scheduled: Option<&'a str>,
    pub tags: &'a [String],
    pub contexts: &'a [String],
    pub projects: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<&'a str>,
}

impl<'a> From<&'a TaskRecord> for TaskOutput<'a> {
    fn from(task: &'a TaskRecord) -> Self {
        Self {
            path: &task.path,
            title: &task.title,
            status: &task.status,
            priority: &task.priority,
            due: task.due.as_deref(),
            scheduled: task.scheduled.as_deref(),
            tags: &task.tags,
            contexts: &task.contexts,
            projects: &task.projects,
            recurrence: task.recurrence.as_deref(),
        }
    }
}

/// JSON output structure for one group of the list command.
#[derive(Serialize)]
pub struct GroupOutput<'a> {
    pub key: &'a str,
    pub label: &'a str,
    pub tasks: Vec<TaskOutput<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subgroups: Vec<GroupOutput<'a>>,
}

impl<'a> From<&'a TaskGroup<'a>> for GroupOutput<'a> {
    fn from(group: &'a TaskGroup<'a>) -> Self {
        Self {
            key: &group.key,
            label: &group.label,
            tasks: group.tasks.iter().map(|t| TaskOutput::from(*t)).collect(),
            subgroups: group.subgroups.iter().map(GroupOutput::from).collect(),
        }
    }
}

/// JSON output structure for list command.
#[derive(Serialize)]
pub struct ListOutput<'a> {
    /// Saved view the query matches, if any.
    pub view: Option<&'a str>,
    pub total: usize,
    pub truncated: bool,
    pub groups: Vec<GroupOutput<'a>>,
}

/// Formats list groups as JSON.
pub fn format_groups_json(
    groups: &[TaskGroup<'_>],
    view: Option<&str>,
    total: usize,
    truncated: bool,
) -> Result<String, serde_json::Error> {
    let output = ListOutput {
        view,
        total,
        truncated,
        groups: groups.iter().map(GroupOutput::from).collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats one task as a table row.
pub fn format_task_row(task: &TaskRecord, style: &TaskStyle<'_>) -> String {
    let date = task.due_date().or_else(|| task.scheduled_date());
    let title = format!("{}{}", recurrence_marker(task), truncate_str(&task.title, 40));
    format!(
        "{:<42} {:<12} {:<12} {:<12} {}",
        title,
        format_status(&task.status, style.statuses, style.use_colors),
        format_priority(&task.priority, style.priorities, style.use_colors),
        format_day(date, style.today, style.use_colors),
        format_labels(task, 30),
    )
}

fn push_group(output: &mut String, group: &TaskGroup<'_>, depth: usize, style: &TaskStyle<'_>) {
    let indent = "  ".repeat(depth);
    let heading = format!("{} ({})", group.label, group.tasks.len());
    if style.use_colors {
        output.push_str(&format!("{indent}{}\n", heading.bold()));
    } else {
        output.push_str(&format!("{indent}{heading}\n"));
    }

    if group.subgroups.is_empty() {
        for task in &group.tasks {
            output.push_str(&format!("{indent}  {}\n", format_task_row(task, style)));
        }
    } else {
        for subgroup in &group.subgroups {
            push_group(output, subgroup, depth + 1, style);
        }
    }
}

/// Formats list groups as a table.
///
/// A single ungrouped bucket is printed without a heading.
pub fn format_groups_table(groups: &[TaskGroup<'_>], style: &TaskStyle<'_>) -> String {
    if groups.iter().all(|g| g.tasks.is_empty()) {
        return "No tasks found.\n".to_string();
    }

    let mut output = String::new();
    if let [only] = groups {
        if only.subgroups.is_empty() && only.key == taskview_core::filter::ALL_GROUP_KEY {
            for task in &only.tasks {
                output.push_str(&format_task_row(task, style));
                output.push('\n');
            }
            return output;
        }
    }

    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        push_group(&mut output, group, 0, style);
    }
    output
}

/// JSON output for the state of one task on one day.
#[derive(Serialize)]
pub struct InstanceOutput<'a> {
    pub path: &'a str,
    pub title: &'a str,
    pub date: String,
    pub recurring: bool,
    pub status: EffectiveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Formats an instance state as JSON.
pub fn format_instance_json(output: &InstanceOutput<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(output)
}

/// Formats an instance state for display.
pub fn format_instance(output: &InstanceOutput<'_>, use_colors: bool) -> String {
    let status = match output.status {
        EffectiveStatus::Completed if use_colors => output.status.as_str().green().to_string(),
        EffectiveStatus::Skipped if use_colors => output.status.as_str().dimmed().to_string(),
        _ => output.status.as_str().to_string(),
    };
    let mut line = format!("{} on {}: {}", output.title, output.date, status);
    if let Some(next) = &output.next {
        line.push_str(&format!(" (next: {next})"));
    }
    line
}
