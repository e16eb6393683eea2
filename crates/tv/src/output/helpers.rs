//! Common helper functions for output formatting.

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use taskview_model::models::{PriorityRegistry, StatusRegistry, TaskRecord};

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a priority value with its registry label.
pub fn format_priority(value: &str, priorities: &PriorityRegistry, use_colors: bool) -> String {
    let label = priorities.label(value).to_string();
    if !use_colors {
        return label;
    }
    match priorities.weight(value) {
        0 => label.dimmed().to_string(),
        1 => label.blue().to_string(),
        2 => label.yellow().to_string(),
        _ => label.red().to_string(),
    }
}

/// Formats a status value with its registry label.
pub fn format_status(value: &str, statuses: &StatusRegistry, use_colors: bool) -> String {
    let label = statuses.label(value).to_string();
    if use_colors && statuses.is_completed(value) {
        label.green().to_string()
    } else {
        label
    }
}

/// Formats a date relative to `today`.
pub fn format_day(date: Option<NaiveDate>, today: NaiveDate, use_colors: bool) -> String {
    let Some(date) = date else {
        return String::new();
    };

    let days = (date - today).num_days();
    let display = match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        d if d < 0 => format!("{} days ago", -d),
        _ => date.format("%b %d").to_string(),
    };

    if !use_colors {
        return display;
    }
    if days < 0 {
        display.red().to_string()
    } else if days == 0 {
        display.yellow().to_string()
    } else {
        display
    }
}

/// Formats an agenda day heading, e.g. `Mon Mar 10 (Today)`.
pub fn format_day_heading(date: NaiveDate, today: NaiveDate) -> String {
    let base = date.format("%a %b %d").to_string();
    match (date - today).num_days() {
        0 => format!("{base} (Today)"),
        1 => format!("{base} (Tomorrow)"),
        _ => base,
    }
}

/// Formats tags, contexts and projects as one space-separated string.
pub fn format_labels(task: &TaskRecord, max_len: usize) -> String {
    let formatted: Vec<String> = task
        .tags
        .iter()
        .map(|t| format!("#{t}"))
        .chain(task.contexts.iter().map(|c| {
            if c.starts_with('@') {
                c.clone()
            } else {
                format!("@{c}")
            }
        }))
        .chain(task.projects.iter().map(|p| format!("+{p}")))
        .collect();

    truncate_str(&formatted.join(" "), max_len)
}

/// Marker shown before recurring task titles.
pub fn recurrence_marker(task: &TaskRecord) -> &'static str {
    if task.is_recurring() {
        "↻ "
    } else {
        ""
    }
}
