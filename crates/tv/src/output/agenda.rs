//! Agenda output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use taskview_core::{effective_status, AgendaData, EffectiveStatus};

use super::helpers::format_day_heading;
use super::tasks::{format_task_row, TaskOutput, TaskStyle};

/// JSON output for an agenda task: the task plus its state on the bucket day.
#[derive(Serialize)]
pub struct AgendaTaskOutput<'a> {
    #[serde(flatten)]
    pub task: TaskOutput<'a>,
    pub instance_status: EffectiveStatus,
}

/// JSON output for one agenda day.
#[derive(Serialize)]
pub struct AgendaDayOutput<'a> {
    pub date: String,
    pub tasks: Vec<AgendaTaskOutput<'a>>,
}

/// JSON output structure for the agenda command.
#[derive(Serialize)]
pub struct AgendaOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdue: Option<Vec<TaskOutput<'a>>>,
    pub days: Vec<AgendaDayOutput<'a>>,
}

/// Formats agenda data as JSON. The overdue key is omitted when the
/// section is hidden.
pub fn format_agenda_json(
    data: &AgendaData<'_>,
    show_overdue: bool,
    style: &TaskStyle<'_>,
) -> Result<String, serde_json::Error> {
    let output = AgendaOutput {
        overdue: show_overdue
            .then(|| data.overdue.iter().map(|t| TaskOutput::from(*t)).collect()),
        days: data
            .days
            .iter()
            .map(|bucket| AgendaDayOutput {
                date: bucket.date.format("%Y-%m-%d").to_string(),
                tasks: bucket
                    .tasks
                    .iter()
                    .map(|t| AgendaTaskOutput {
                        task: TaskOutput::from(*t),
                        instance_status: effective_status(t, bucket.date, style.statuses),
                    })
                    .collect(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

fn heading(text: &str, use_colors: bool, overdue: bool) -> String {
    match (use_colors, overdue) {
        (true, true) => text.red().bold().to_string(),
        (true, false) => text.bold().to_string(),
        (false, _) => text.to_string(),
    }
}

/// Formats agenda data for display.
///
/// Empty days are listed with a dash so the week keeps its shape.
pub fn format_agenda_text(data: &AgendaData<'_>, show_overdue: bool, style: &TaskStyle<'_>) -> String {
    let mut output = String::new();

    if show_overdue && !data.overdue.is_empty() {
        output.push_str(&heading(
            &format!("Overdue ({})", data.overdue.len()),
            style.use_colors,
            true,
        ));
        output.push('\n');
        for task in &data.overdue {
            output.push_str(&format!("  {}\n", format_task_row(task, style)));
        }
        output.push('\n');
    }

    for bucket in &data.days {
        output.push_str(&heading(
            &format_day_heading(bucket.date, style.today),
            style.use_colors,
            false,
        ));
        output.push('\n');
        if bucket.tasks.is_empty() {
            output.push_str("  -\n");
        }
        for task in &bucket.tasks {
            let mark = match effective_status(task, bucket.date, style.statuses) {
                EffectiveStatus::Open => "[ ]",
                EffectiveStatus::Completed => "[x]",
                EffectiveStatus::Skipped => "[-]",
            };
            output.push_str(&format!("  {mark} {}\n", format_task_row(task, style)));
        }
    }
    output
}
