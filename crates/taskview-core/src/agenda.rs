//! Agenda partitioning.
//!
//! Splits a filtered, sorted task list into one bucket per target day plus a
//! single overdue bucket. Every task lands in at most one bucket; tasks with
//! no resolvable date land in none. Nothing is cached between calls, so an
//! edited due date is picked up on the next partition.

use chrono::NaiveDate;
use serde::Serialize;
use taskview_model::date::add_days;
use taskview_model::models::{RecurrenceAnchor, TaskRecord};

use crate::filter::{FilterContext, FilterEvaluator, FilterQuery};
use crate::recurrence::{
    effective_status, instance_date_on_or_after, try_is_instance_on, EffectiveStatus,
    RecurrenceExpander,
};

/// Tasks assigned to one agenda day.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaBucket<'a> {
    pub date: NaiveDate,
    pub tasks: Vec<&'a TaskRecord>,
}

/// Result of partitioning tasks over a date window.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaData<'a> {
    /// One bucket per target date, in the order the dates were given.
    pub days: Vec<AgendaBucket<'a>>,
    pub overdue: Vec<&'a TaskRecord>,
}

impl AgendaData<'_> {
    /// Total number of placed tasks.
    pub fn len(&self) -> usize {
        self.overdue.len() + self.days.iter().map(|d| d.tasks.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns `days` consecutive dates starting at `start`.
pub fn agenda_dates(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..i64::from(days)).map(|offset| add_days(start, offset)).collect()
}

/// The date a task is compared against the window: due, then scheduled,
/// then (recurring only) the next instance on or after `earliest`.
///
/// A completion-anchored series with a recorded completion has moved past
/// its stored dates, so its next instance is used first.
fn comparison_date(
    task: &TaskRecord,
    earliest: NaiveDate,
    expander: &dyn RecurrenceExpander,
) -> Option<NaiveDate> {
    let restarted = task.recurrence_anchor == RecurrenceAnchor::Completion
        && task.latest_completed_instance().is_some();
    if task.is_recurring() && restarted {
        if let Some(date) = next_instance(task, earliest, expander) {
            return Some(date);
        }
    }
    if let Some(date) = task.due_date().or_else(|| task.scheduled_date()) {
        return Some(date);
    }
    if !task.is_recurring() {
        return None;
    }
    next_instance(task, earliest, expander)
}

fn next_instance(
    task: &TaskRecord,
    earliest: NaiveDate,
    expander: &dyn RecurrenceExpander,
) -> Option<NaiveDate> {
    match instance_date_on_or_after(task, earliest, expander) {
        Ok(date) => date,
        Err(err) => {
            tracing::warn!(path = %task.path, error = %err, "ignoring unparseable recurrence rule");
            None
        }
    }
}

/// Picks the day bucket for a task that is not overdue.
fn day_for(
    task: &TaskRecord,
    comparison: Option<NaiveDate>,
    dates: &[NaiveDate],
    expander: &dyn RecurrenceExpander,
) -> Option<usize> {
    if task.is_recurring() {
        let mut placed = None;
        for (index, date) in dates.iter().enumerate() {
            match try_is_instance_on(task, *date, expander) {
                Ok(true) => {
                    placed = Some(index);
                    break;
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!(
                        path = %task.path,
                        error = %err,
                        "recurrence rule unusable, placing by date"
                    );
                    return comparison.and_then(|c| dates.iter().position(|d| *d == c));
                }
            }
        }
        return placed;
    }
    comparison.and_then(|c| dates.iter().position(|d| *d == c))
}

/// Partitions already filtered and sorted tasks into agenda buckets.
///
/// With `show_overdue`, a task whose comparison date falls before the first
/// target date goes to the overdue bucket only, unless its instance on that
/// date is already completed or skipped.
pub fn partition<'a>(
    tasks: &[&'a TaskRecord],
    dates: &[NaiveDate],
    show_overdue: bool,
    context: &FilterContext<'_>,
    expander: &dyn RecurrenceExpander,
) -> AgendaData<'a> {
    let mut data = AgendaData {
        days: dates
            .iter()
            .map(|date| AgendaBucket {
                date: *date,
                tasks: Vec::new(),
            })
            .collect(),
        overdue: Vec::new(),
    };
    let (Some(first), Some(earliest)) = (dates.first().copied(), dates.iter().min().copied()) else {
        return data;
    };

    for task in tasks {
        let comparison = comparison_date(task, earliest, expander);

        if let Some(date) = comparison.filter(|date| show_overdue && *date < first) {
            if effective_status(task, date, context.statuses()) == EffectiveStatus::Open {
                data.overdue.push(*task);
                continue;
            }
        }

        if let Some(index) = day_for(task, comparison, dates, expander) {
            data.days[index].tasks.push(*task);
        }
    }

    tracing::debug!(
        tasks = tasks.len(),
        placed = data.len(),
        overdue = data.overdue.len(),
        "partitioned agenda"
    );
    data
}

/// Filters, sorts and partitions tasks for an agenda window.
pub fn get_agenda_data<'a>(
    tasks: &'a [TaskRecord],
    dates: &[NaiveDate],
    query: &FilterQuery,
    show_overdue: bool,
    context: &FilterContext<'_>,
    expander: &dyn RecurrenceExpander,
) -> AgendaData<'a> {
    let evaluator = FilterEvaluator::new(query, context);
    let sorted = evaluator.filter_and_sort(tasks);
    partition(&sorted, dates, show_overdue, context, expander)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterCondition, FilterOperator, PropertyId, SortKey};
    use crate::recurrence::{toggle_instance_completion, RRuleExpander};
    use taskview_model::models::{PriorityRegistry, StatusRegistry};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2025, 3, 10);

    fn today() -> NaiveDate {
        ymd(TODAY.0, TODAY.1, TODAY.2)
    }

    fn task(path: &str) -> TaskRecord {
        TaskRecord::new(path, path.trim_end_matches(".md"))
    }

    fn due(path: &str, date: &str) -> TaskRecord {
        let mut t = task(path);
        t.due = Some(date.to_string());
        t
    }

    fn daily(path: &str, scheduled: &str) -> TaskRecord {
        let mut t = task(path);
        t.recurrence = Some("FREQ=DAILY".to_string());
        t.scheduled = Some(scheduled.to_string());
        t
    }

    fn run(tasks: &[TaskRecord], show_overdue: bool) -> (Vec<Vec<String>>, Vec<String>) {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]).with_today(today());
        let dates = agenda_dates(today(), 3);
        let data = get_agenda_data(
            tasks,
            &dates,
            &FilterQuery::default(),
            show_overdue,
            &context,
            &RRuleExpander,
        );
        let days = data
            .days
            .iter()
            .map(|b| b.tasks.iter().map(|t| t.path.clone()).collect())
            .collect();
        let overdue = data.overdue.iter().map(|t| t.path.clone()).collect();
        (days, overdue)
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ==================== Window ====================

    #[test]
    fn test_agenda_dates() {
        assert_eq!(
            agenda_dates(ymd(2025, 2, 27), 3),
            vec![ymd(2025, 2, 27), ymd(2025, 2, 28), ymd(2025, 3, 1)]
        );
        assert!(agenda_dates(today(), 0).is_empty());
    }

    #[test]
    fn test_empty_window_places_nothing() {
        let tasks = vec![due("a.md", "2025-03-10")];
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);
        let refs: Vec<&TaskRecord> = tasks.iter().collect();

        let data = partition(&refs, &[], true, &context, &RRuleExpander);
        assert!(data.is_empty());
        assert!(data.days.is_empty());
    }

    // ==================== Scenarios ====================

    #[test]
    fn test_overdue_one_off_goes_to_overdue_only() {
        let tasks = vec![due("late.md", "2025-03-09")];
        let (days, overdue) = run(&tasks, true);
        assert_eq!(overdue, names(&["late.md"]));
        assert!(days.iter().all(|d| d.is_empty()));
    }

    #[test]
    fn test_due_today_goes_to_today_only() {
        let tasks = vec![due("now.md", "2025-03-10")];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert_eq!(days[0], names(&["now.md"]));
        assert!(days[1].is_empty() && days[2].is_empty());
    }

    #[test]
    fn test_daily_scheduled_yesterday_is_overdue() {
        let tasks = vec![daily("habit.md", "2025-03-09")];
        let (days, overdue) = run(&tasks, true);
        assert_eq!(overdue, names(&["habit.md"]));
        assert!(days.iter().all(|d| d.is_empty()));
    }

    #[test]
    fn test_daily_scheduled_today_is_due_today() {
        let tasks = vec![daily("habit.md", "2025-03-10")];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert_eq!(days[0], names(&["habit.md"]));
        assert!(days[1].is_empty() && days[2].is_empty());
    }

    #[test]
    fn test_edited_due_date_moves_out_of_overdue() {
        let mut tasks = vec![due("moved.md", "2025-03-07")];
        let (_, overdue) = run(&tasks, true);
        assert_eq!(overdue, names(&["moved.md"]));

        tasks[0].due = Some("2025-03-10".to_string());
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert_eq!(days[0], names(&["moved.md"]));
    }

    // ==================== Placement Rules ====================

    #[test]
    fn test_without_overdue_section_past_tasks_vanish() {
        let tasks = vec![due("late.md", "2025-03-09")];
        let (days, overdue) = run(&tasks, false);
        assert!(overdue.is_empty());
        assert!(days.iter().all(|d| d.is_empty()));
    }

    #[test]
    fn test_without_overdue_section_recurring_lands_on_first_instance() {
        let tasks = vec![daily("habit.md", "2025-03-01")];
        let (days, overdue) = run(&tasks, false);
        assert!(overdue.is_empty());
        assert_eq!(days[0], names(&["habit.md"]));
        assert!(days[1].is_empty());
    }

    #[test]
    fn test_undated_one_off_goes_nowhere() {
        let tasks = vec![task("someday.md")];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert!(days.iter().all(|d| d.is_empty()));
    }

    #[test]
    fn test_future_task_lands_on_its_day() {
        let tasks = vec![due("later.md", "2025-03-12"), due("beyond.md", "2025-03-20")];
        let (days, _) = run(&tasks, true);
        assert_eq!(days[2], names(&["later.md"]));
        assert_eq!(days.iter().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn test_completed_past_instance_is_not_overdue() {
        let habit = daily("habit.md", "2025-03-09");
        let habit = toggle_instance_completion(&habit, ymd(2025, 3, 9));
        let tasks = vec![habit];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert_eq!(days[0], names(&["habit.md"]));
    }

    #[test]
    fn test_done_one_off_in_past_is_not_overdue() {
        let mut finished = due("finished.md", "2025-03-08");
        finished.status = "done".to_string();
        let tasks = vec![finished];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert!(days.iter().all(|d| d.is_empty()));
    }

    #[test]
    fn test_weekly_recurring_lands_on_its_weekday() {
        // 2025-03-10 is a Monday; window is Mon..Wed.
        let mut weekly = task("weekly.md");
        weekly.recurrence = Some("FREQ=WEEKLY;BYDAY=TU".to_string());
        weekly.scheduled = Some("2025-03-11".to_string());
        let tasks = vec![weekly];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert_eq!(days[1], names(&["weekly.md"]));
    }

    #[test]
    fn test_recurring_without_dates_uses_next_instance() {
        let mut weekly = task("weekly.md");
        weekly.recurrence = Some("DTSTART:20250301\nRRULE:FREQ=WEEKLY;BYDAY=WE".to_string());
        let tasks = vec![weekly];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert_eq!(days[2], names(&["weekly.md"]));
    }

    #[test]
    fn test_completion_anchor_places_next_instance() {
        // Every two days counted from the latest completion (2025-03-09).
        let mut chore = task("chore.md");
        chore.recurrence = Some("FREQ=DAILY;INTERVAL=2".to_string());
        chore.recurrence_anchor = RecurrenceAnchor::Completion;
        chore.date_created = Some("2025-03-01".to_string());
        chore.complete_instances = vec!["2025-03-09".to_string()];
        let tasks = vec![chore];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert_eq!(days[1], names(&["chore.md"]));
    }

    #[test]
    fn test_completion_anchor_ignores_stale_scheduled_date() {
        // Scheduled date predates the latest completion and must not count as overdue.
        let mut chore = task("chore.md");
        chore.recurrence = Some("FREQ=DAILY;INTERVAL=2".to_string());
        chore.recurrence_anchor = RecurrenceAnchor::Completion;
        chore.scheduled = Some("2025-03-01".to_string());
        chore.complete_instances = vec!["2025-03-09".to_string()];
        let tasks = vec![chore.clone()];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert!(days[0].is_empty());
        assert_eq!(days[1], names(&["chore.md"]));

        // Without a completion the stored date still applies
        chore.complete_instances.clear();
        let tasks = vec![chore];
        let (_, overdue) = run(&tasks, true);
        assert_eq!(overdue, names(&["chore.md"]));
    }

    #[test]
    fn test_bad_rule_falls_back_to_date_equality() {
        let mut broken = task("broken.md");
        broken.recurrence = Some("FREQ=FORTNIGHTLY".to_string());
        broken.scheduled = Some("2025-03-11".to_string());
        let tasks = vec![broken];
        let (days, overdue) = run(&tasks, true);
        assert!(overdue.is_empty());
        assert_eq!(days[1], names(&["broken.md"]));
    }

    #[test]
    fn test_no_task_is_placed_twice() {
        let tasks = vec![
            due("late.md", "2025-03-01"),
            due("now.md", "2025-03-10"),
            daily("habit.md", "2025-03-10"),
            daily("stale.md", "2025-03-02"),
            task("undated.md"),
        ];
        let (days, overdue) = run(&tasks, true);
        let mut all: Vec<String> = days.into_iter().flatten().chain(overdue).collect();
        let placed = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), placed);
        assert_eq!(placed, 4);
    }

    // ==================== Pipeline ====================

    #[test]
    fn test_get_agenda_data_filters_and_sorts() {
        let mut b = due("b.md", "2025-03-10");
        b.tags = vec!["work".to_string()];
        let mut a = due("a.md", "2025-03-10");
        a.tags = vec!["work".to_string()];
        let home = due("home.md", "2025-03-10");
        let tasks = vec![b, home, a];

        let mut query = FilterQuery::default();
        query.sort_key = SortKey::Title;
        query
            .root
            .children
            .push(FilterCondition::new(PropertyId::Tags, FilterOperator::Contains, "work").into());

        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]).with_today(today());
        let data = get_agenda_data(
            &tasks,
            &agenda_dates(today(), 1),
            &query,
            true,
            &context,
            &RRuleExpander,
        );
        let paths: Vec<&str> = data.days[0].tasks.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "b.md"]);
    }
}
