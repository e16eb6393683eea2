//! Task ordering.

use std::cmp::Ordering;

use chrono::NaiveDate;
use taskview_model::models::TaskRecord;

use super::evaluator::FilterContext;
use super::query::{SortDirection, SortKey};

/// Primary sort value of a task under some key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Date(NaiveDate),
    Weight(u32),
    Position(usize),
    Text(String),
}

fn sort_value(task: &TaskRecord, key: SortKey, context: &FilterContext<'_>) -> Option<SortValue> {
    match key {
        SortKey::Due => task.due_date().map(SortValue::Date),
        SortKey::Scheduled => task.scheduled_date().map(SortValue::Date),
        SortKey::DateCreated => task.created_date().map(SortValue::Date),
        SortKey::CompletedDate => task
            .completed_date
            .as_deref()
            .and_then(taskview_model::date::parse_calendar_date)
            .map(SortValue::Date),
        SortKey::Priority => Some(SortValue::Weight(context.priorities().weight(&task.priority))),
        SortKey::Status => context.statuses().position(&task.status).map(SortValue::Position),
        SortKey::Title => Some(SortValue::Text(task.title.to_lowercase())),
        SortKey::None => None,
    }
}

/// Compares two tasks under `key` and `direction`.
///
/// Tasks without a value for the key sort after those with one, in either
/// direction. Ties break on title (case-insensitive, ascending) and then path,
/// so the order is total.
pub fn compare_tasks(
    a: &TaskRecord,
    b: &TaskRecord,
    key: SortKey,
    direction: SortDirection,
    context: &FilterContext<'_>,
) -> Ordering {
    let primary = match (sort_value(a, key, context), sort_value(b, key, context)) {
        (Some(x), Some(y)) => match direction {
            SortDirection::Asc => x.cmp(&y),
            SortDirection::Desc => y.cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    primary
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.path.cmp(&b.path))
}

/// Sorts tasks in place. `SortKey::None` keeps the input order.
pub fn sort_tasks(
    tasks: &mut [&TaskRecord],
    key: SortKey,
    direction: SortDirection,
    context: &FilterContext<'_>,
) {
    if key == SortKey::None {
        return;
    }
    tasks.sort_by(|a, b| compare_tasks(a, b, key, direction, context));
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskview_model::models::{PriorityRegistry, StatusRegistry};

    fn task(path: &str, title: &str) -> TaskRecord {
        TaskRecord::new(path, title)
    }

    fn titles(tasks: &[&TaskRecord]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_sort_by_due_missing_last_in_both_directions() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let mut a = task("a.md", "A");
        a.due = Some("2025-03-12".to_string());
        let mut b = task("b.md", "B");
        b.due = Some("2025-03-10".to_string());
        let c = task("c.md", "C");

        let mut list = vec![&c, &a, &b];
        sort_tasks(&mut list, SortKey::Due, SortDirection::Asc, &context);
        assert_eq!(titles(&list), vec!["B", "A", "C"]);

        sort_tasks(&mut list, SortKey::Due, SortDirection::Desc, &context);
        assert_eq!(titles(&list), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_sort_by_priority_weight() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let mut high = task("h.md", "High");
        high.priority = "high".to_string();
        let mut low = task("l.md", "Low");
        low.priority = "low".to_string();
        let normal = task("n.md", "Normal");

        let mut list = vec![&normal, &high, &low];
        sort_tasks(&mut list, SortKey::Priority, SortDirection::Desc, &context);
        assert_eq!(titles(&list), vec!["High", "Normal", "Low"]);
    }

    #[test]
    fn test_sort_by_status_follows_registry_order() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let mut done = task("d.md", "Done");
        done.status = "done".to_string();
        let mut progress = task("p.md", "Progress");
        progress.status = "in-progress".to_string();
        let mut odd = task("o.md", "Odd");
        odd.status = "waiting".to_string();
        let open = task("x.md", "Open");

        let mut list = vec![&odd, &done, &open, &progress];
        sort_tasks(&mut list, SortKey::Status, SortDirection::Asc, &context);
        assert_eq!(titles(&list), vec!["Open", "Progress", "Done", "Odd"]);
    }

    #[test]
    fn test_ties_break_on_title_then_path() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let a = task("z.md", "alpha");
        let b = task("a.md", "Alpha");
        let c = task("m.md", "beta");

        let mut list = vec![&c, &a, &b];
        sort_tasks(&mut list, SortKey::Priority, SortDirection::Desc, &context);
        let paths: Vec<&str> = list.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "z.md", "m.md"]);
    }

    #[test]
    fn test_sort_key_none_keeps_input_order() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let a = task("a.md", "Zeta");
        let b = task("b.md", "Alpha");
        let mut list = vec![&a, &b];
        sort_tasks(&mut list, SortKey::None, SortDirection::Asc, &context);
        assert_eq!(titles(&list), vec!["Zeta", "Alpha"]);
    }
}
