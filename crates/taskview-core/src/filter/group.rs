//! Task grouping.
//!
//! Grouping preserves the incoming order of tasks within each group, so tasks
//! are sorted first and grouped afterwards. Multi-valued keys (tags, contexts,
//! projects, list user fields) place a task in every group it has a value for.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use taskview_model::date::{add_days, parse_calendar_date};
use taskview_model::models::{TaskRecord, UserFieldKind};

use super::evaluator::FilterContext;
use super::query::GroupKey;

/// Key of the single group produced by [`GroupKey::None`].
pub const ALL_GROUP_KEY: &str = "all";

/// Key of the catch-all group for tasks without a value.
pub const NONE_GROUP_KEY: &str = "none";

/// One group of tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskGroup<'a> {
    /// Stable key (status value, tag, date bucket id...).
    pub key: String,
    /// Display label.
    pub label: String,
    pub tasks: Vec<&'a TaskRecord>,
    /// Subgroups, when a subgroup key is set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subgroups: Vec<TaskGroup<'a>>,
}

/// Membership of a task in one group, with the group's ordering rank.
#[derive(Debug, Clone)]
struct Slot {
    key: String,
    label: String,
    rank: (usize, String),
}

impl Slot {
    fn ranked(key: impl Into<String>, label: impl Into<String>, rank: usize) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            rank: (rank, String::new()),
        }
    }

    fn alphabetical(value: &str) -> Self {
        Self {
            key: value.to_string(),
            label: value.to_string(),
            rank: (0, value.to_lowercase()),
        }
    }

    fn empty(label: &str) -> Self {
        Self {
            key: NONE_GROUP_KEY.to_string(),
            label: label.to_string(),
            rank: (usize::MAX, String::new()),
        }
    }
}

/// Relative date buckets, in display order.
const DATE_BUCKETS: [(&str, &str); 5] = [
    ("overdue", "Overdue"),
    ("today", "Today"),
    ("tomorrow", "Tomorrow"),
    ("next-seven-days", "Next seven days"),
    ("later", "Later"),
];

fn date_bucket(date: Option<NaiveDate>, today: NaiveDate, empty_label: &str) -> Slot {
    let Some(date) = date else {
        return Slot::empty(empty_label);
    };
    let index = if date < today {
        0
    } else if date == today {
        1
    } else if date == add_days(today, 1) {
        2
    } else if date <= add_days(today, 7) {
        3
    } else {
        4
    };
    let (key, label) = DATE_BUCKETS[index];
    Slot::ranked(key, label, index)
}

fn list_slots(values: &[String], empty_label: &str) -> Vec<Slot> {
    let mut slots: Vec<Slot> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(Slot::alphabetical)
        .collect();
    if slots.is_empty() {
        slots.push(Slot::empty(empty_label));
    }
    slots
}

fn slots_for(task: &TaskRecord, key: &GroupKey, context: &FilterContext<'_>) -> Vec<Slot> {
    match key {
        GroupKey::None => vec![Slot::ranked(ALL_GROUP_KEY, "All tasks", 0)],
        GroupKey::Status => {
            let statuses = context.statuses();
            let label = statuses.label(&task.status).to_string();
            match statuses.position(&task.status) {
                Some(pos) => vec![Slot::ranked(task.status.clone(), label, pos)],
                None if task.status.trim().is_empty() => vec![Slot::empty("No status")],
                None => vec![Slot {
                    key: task.status.clone(),
                    label,
                    rank: (usize::MAX - 1, task.status.to_lowercase()),
                }],
            }
        }
        GroupKey::Priority => {
            let priorities = context.priorities();
            if task.priority.trim().is_empty() {
                return vec![Slot::empty("No priority")];
            }
            // Heaviest first.
            let weight = priorities.weight(&task.priority) as usize;
            let label = priorities.label(&task.priority).to_string();
            vec![Slot {
                key: task.priority.clone(),
                label,
                rank: (usize::MAX - 1 - weight, task.priority.to_lowercase()),
            }]
        }
        GroupKey::Context => list_slots(&task.contexts, "No context"),
        GroupKey::Project => list_slots(&task.projects, "No project"),
        GroupKey::Tags => list_slots(&task.tags, "No tags"),
        GroupKey::Due => vec![date_bucket(task.due_date(), context.today(), "No due date")],
        GroupKey::Scheduled => vec![date_bucket(
            task.scheduled_date(),
            context.today(),
            "No scheduled date",
        )],
        GroupKey::User(id) => user_slots(task, id, context),
    }
}

fn user_slots(task: &TaskRecord, field_id: &str, context: &FilterContext<'_>) -> Vec<Slot> {
    use serde_json::Value;

    let Some(field) = context.user_field(field_id) else {
        return vec![Slot::empty("No value")];
    };
    let empty_label = format!("No {}", field.display_name);
    let raw = task.custom_value(&field.key);

    match (field.kind, raw) {
        (UserFieldKind::Date, Some(Value::String(s))) => {
            vec![date_bucket(parse_calendar_date(s), context.today(), &empty_label)]
        }
        (_, Some(Value::Array(items))) => {
            let values: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect();
            list_slots(&values, &empty_label)
        }
        (UserFieldKind::List, Some(Value::String(s))) => {
            let values: Vec<String> = s.split(',').map(str::to_string).collect();
            list_slots(&values, &empty_label)
        }
        (_, Some(Value::String(s))) if !s.trim().is_empty() => vec![Slot::alphabetical(s.trim())],
        (_, Some(Value::Number(n))) => vec![Slot::alphabetical(&n.to_string())],
        (_, Some(Value::Bool(b))) => vec![Slot::alphabetical(&b.to_string())],
        _ => vec![Slot::empty(&empty_label)],
    }
}

fn group_once<'a>(
    tasks: &[&'a TaskRecord],
    key: &GroupKey,
    context: &FilterContext<'_>,
) -> Vec<TaskGroup<'a>> {
    let mut groups: Vec<(Slot, Vec<&'a TaskRecord>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for task in tasks {
        for slot in slots_for(task, key, context) {
            let position = match index.get(&slot.key) {
                Some(&position) => position,
                None => {
                    index.insert(slot.key.clone(), groups.len());
                    groups.push((slot.clone(), Vec::new()));
                    groups.len() - 1
                }
            };
            let members = &mut groups[position].1;
            // A task listing the same value twice still appears once.
            if !members.iter().any(|t| std::ptr::eq(*t, *task)) {
                members.push(*task);
            }
        }
    }

    groups.sort_by(|(a, _), (b, _)| a.rank.cmp(&b.rank));
    groups
        .into_iter()
        .map(|(slot, tasks)| TaskGroup {
            key: slot.key,
            label: slot.label,
            tasks,
            subgroups: Vec::new(),
        })
        .collect()
}

/// Groups already-sorted tasks by `key`, and each group by `subgroup_key` when set.
///
/// Groups for known registry values follow registry order; free-form values
/// are alphabetical; date keys use relative buckets (overdue, today, tomorrow,
/// next seven days, later). The group for tasks without a value comes last.
pub fn group_tasks<'a>(
    tasks: &[&'a TaskRecord],
    key: &GroupKey,
    subgroup_key: Option<&GroupKey>,
    context: &FilterContext<'_>,
) -> Vec<TaskGroup<'a>> {
    let mut groups = group_once(tasks, key, context);
    if let Some(subkey) = subgroup_key.filter(|k| **k != GroupKey::None) {
        for group in &mut groups {
            group.subgroups = group_once(&group.tasks, subkey, context);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskview_model::models::{PriorityRegistry, StatusRegistry, UserFieldDefinition};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn keys(groups: &[TaskGroup<'_>]) -> Vec<String> {
        groups.iter().map(|g| g.key.clone()).collect()
    }

    #[test]
    fn test_group_none_is_single_group() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);
        let a = TaskRecord::new("a.md", "A");
        let b = TaskRecord::new("b.md", "B");

        let groups = group_tasks(&[&a, &b], &GroupKey::None, None, &context);
        assert_eq!(keys(&groups), vec!["all"]);
        assert_eq!(groups[0].tasks.len(), 2);
    }

    #[test]
    fn test_group_by_status_registry_order() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let mut done = TaskRecord::new("d.md", "D");
        done.status = "done".to_string();
        let open = TaskRecord::new("o.md", "O");
        let mut custom = TaskRecord::new("c.md", "C");
        custom.status = "waiting".to_string();

        let groups = group_tasks(&[&custom, &done, &open], &GroupKey::Status, None, &context);
        assert_eq!(keys(&groups), vec!["open", "done", "waiting"]);
        assert_eq!(groups[1].label, "Done");
    }

    #[test]
    fn test_group_by_priority_heaviest_first() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let mut low = TaskRecord::new("l.md", "L");
        low.priority = "low".to_string();
        let mut high = TaskRecord::new("h.md", "H");
        high.priority = "high".to_string();

        let groups = group_tasks(&[&low, &high], &GroupKey::Priority, None, &context);
        assert_eq!(keys(&groups), vec!["high", "low"]);
    }

    #[test]
    fn test_group_by_tags_is_multi_membership_with_empty_last() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let mut a = TaskRecord::new("a.md", "A");
        a.tags = vec!["work".to_string(), "Errand".to_string()];
        let mut b = TaskRecord::new("b.md", "B");
        b.tags = vec!["work".to_string(), "work".to_string()];
        let c = TaskRecord::new("c.md", "C");

        let groups = group_tasks(&[&a, &b, &c], &GroupKey::Tags, None, &context);
        assert_eq!(keys(&groups), vec!["Errand", "work", "none"]);
        assert_eq!(groups[1].tasks.len(), 2);
        assert_eq!(groups[2].label, "No tags");
    }

    #[test]
    fn test_group_by_due_buckets() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]).with_today(ymd(2025, 3, 10));

        let dated = |path: &str, due: &str| {
            let mut t = TaskRecord::new(path, path);
            t.due = Some(due.to_string());
            t
        };
        let overdue = dated("a.md", "2025-03-01");
        let today = dated("b.md", "2025-03-10");
        let tomorrow = dated("c.md", "2025-03-11");
        let week = dated("d.md", "2025-03-17");
        let later = dated("e.md", "2025-03-18");
        let undated = TaskRecord::new("f.md", "f");

        let groups = group_tasks(
            &[&later, &undated, &week, &tomorrow, &today, &overdue],
            &GroupKey::Due,
            None,
            &context,
        );
        assert_eq!(
            keys(&groups),
            vec!["overdue", "today", "tomorrow", "next-seven-days", "later", "none"]
        );
        assert_eq!(groups[5].label, "No due date");
    }

    #[test]
    fn test_subgroups() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let mut a = TaskRecord::new("a.md", "A");
        a.priority = "high".to_string();
        let mut b = TaskRecord::new("b.md", "B");
        b.status = "done".to_string();

        let groups = group_tasks(&[&a, &b], &GroupKey::Status, Some(&GroupKey::Priority), &context);
        assert_eq!(groups.len(), 2);
        assert_eq!(keys(&groups[0].subgroups), vec!["high"]);
        assert_eq!(keys(&groups[1].subgroups), vec!["normal"]);
    }

    #[test]
    fn test_group_by_user_field() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let fields = vec![UserFieldDefinition {
            id: "client".to_string(),
            display_name: "Client".to_string(),
            key: "client".to_string(),
            kind: UserFieldKind::Text,
        }];
        let context = FilterContext::new(&statuses, &priorities, &fields);

        let mut a = TaskRecord::new("a.md", "A");
        a.custom.insert("client".to_string(), serde_json::json!("Globex"));
        let mut b = TaskRecord::new("b.md", "B");
        b.custom.insert("client".to_string(), serde_json::json!("Acme"));
        let c = TaskRecord::new("c.md", "C");

        let groups = group_tasks(&[&a, &b, &c], &GroupKey::User("client".to_string()), None, &context);
        assert_eq!(keys(&groups), vec!["Acme", "Globex", "none"]);
        assert_eq!(groups[2].label, "No Client");
    }
}
