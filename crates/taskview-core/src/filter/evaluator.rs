//! Filter evaluation against task records.
//!
//! The [`FilterEvaluator`] walks a [`FilterQuery`] tree and tests tasks against
//! it. Reference data (status and priority registries, user field definitions
//! and the day considered "today") comes from a [`FilterContext`].
//!
//! # Example
//!
//! ```
//! use taskview_core::filter::{FilterContext, FilterEvaluator, FilterQuery};
//! use taskview_model::models::{PriorityRegistry, StatusRegistry, TaskRecord};
//!
//! let statuses = StatusRegistry::default();
//! let priorities = PriorityRegistry::default();
//! let context = FilterContext::new(&statuses, &priorities, &[]);
//!
//! let query = FilterQuery::default();
//! let evaluator = FilterEvaluator::new(&query, &context);
//!
//! let tasks = vec![TaskRecord::new("Tasks/a.md", "A")];
//! assert_eq!(evaluator.filter_tasks(&tasks).len(), 1);
//! ```

use chrono::NaiveDate;
use taskview_model::date::{add_days, parse_calendar_date, today};
use taskview_model::models::{
    PriorityRegistry, StatusRegistry, TaskRecord, UserFieldDefinition, UserFieldKind,
};

use super::group::{group_tasks, TaskGroup};
use super::property::{property_definition, FilterOperator, PropertyDefinition, PropertyId, ValueKind};
use super::query::{Conjunction, FilterCondition, FilterGroup, FilterNode, FilterQuery, FilterValue};
use super::sort::sort_tasks;

/// Tolerance for numeric equality.
const NUMBER_EPSILON: f64 = 1e-9;

/// Context for filter evaluation.
#[derive(Debug, Clone)]
pub struct FilterContext<'a> {
    statuses: &'a StatusRegistry,
    priorities: &'a PriorityRegistry,
    user_fields: &'a [UserFieldDefinition],
    today: NaiveDate,
}

impl<'a> FilterContext<'a> {
    /// Creates a new filter context with today's date from the system clock.
    pub fn new(
        statuses: &'a StatusRegistry,
        priorities: &'a PriorityRegistry,
        user_fields: &'a [UserFieldDefinition],
    ) -> Self {
        Self {
            statuses,
            priorities,
            user_fields,
            today: today(),
        }
    }

    /// Overrides the day relative dates resolve against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn statuses(&self) -> &'a StatusRegistry {
        self.statuses
    }

    pub fn priorities(&self) -> &'a PriorityRegistry {
        self.priorities
    }

    pub fn user_fields(&self) -> &'a [UserFieldDefinition] {
        self.user_fields
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Finds a user field definition by id.
    pub fn user_field(&self, id: &str) -> Option<&'a UserFieldDefinition> {
        self.user_fields.iter().find(|f| f.id == id)
    }

    /// Resolves a condition value into a calendar day. Relative tokens are
    /// resolved against [`FilterContext::today`].
    pub fn resolve_date(&self, text: &str) -> Option<NaiveDate> {
        match parse_relative_date(text) {
            Some(offset) => Some(add_days(self.today, offset)),
            None => parse_calendar_date(text),
        }
    }
}

/// Parses a relative date token into a day offset from today.
///
/// Accepted tokens: `today`, `tomorrow`, `yesterday`, `next-week`,
/// `last-week`, `in-<n>-days` and `<n>-days-ago`.
pub fn parse_relative_date(text: &str) -> Option<i64> {
    let token = text.trim().to_ascii_lowercase();
    match token.as_str() {
        "today" => return Some(0),
        "tomorrow" => return Some(1),
        "yesterday" => return Some(-1),
        "next-week" => return Some(7),
        "last-week" => return Some(-7),
        _ => {}
    }
    if let Some(n) = token
        .strip_prefix("in-")
        .and_then(|rest| rest.strip_suffix("-days").or_else(|| rest.strip_suffix("-day")))
    {
        return n.parse::<i64>().ok();
    }
    token
        .strip_suffix("-days-ago")
        .or_else(|| token.strip_suffix("-day-ago"))
        .and_then(|n| n.parse::<i64>().ok())
        .and_then(i64::checked_neg)
}

/// A task's value for one property, normalized for comparison.
#[derive(Debug, Clone, PartialEq)]
enum TaskValue {
    Missing,
    Text(String),
    List(Vec<String>),
    Date(NaiveDate),
    Number(f64),
    Bool(bool),
}

impl TaskValue {
    fn text(value: &str) -> Self {
        if value.trim().is_empty() {
            TaskValue::Missing
        } else {
            TaskValue::Text(value.to_string())
        }
    }

    fn list(values: &[String]) -> Self {
        let items: Vec<String> = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        if items.is_empty() {
            TaskValue::Missing
        } else {
            TaskValue::List(items)
        }
    }

    fn date(value: Option<&str>) -> Self {
        value
            .and_then(parse_calendar_date)
            .map_or(TaskValue::Missing, TaskValue::Date)
    }

    fn is_missing(&self) -> bool {
        matches!(self, TaskValue::Missing)
    }
}

/// Normalizes a list entry for membership tests: case-folded, without a
/// leading `#` and without wikilink brackets.
fn normalize_list_item(value: &str) -> String {
    let trimmed = value.trim().trim_start_matches('#');
    let unlinked = trimmed
        .strip_prefix("[[")
        .and_then(|s| s.strip_suffix("]]"))
        .unwrap_or(trimmed);
    let target = unlinked.split('|').next().unwrap_or(unlinked);
    target.trim().to_lowercase()
}

/// Returns true if `item` equals `needle` or is a hierarchical child of it
/// (`work` matches `work/meetings`).
fn list_item_matches(item: &str, needle: &str) -> bool {
    let item = normalize_list_item(item);
    let needle = normalize_list_item(needle);
    if needle.is_empty() {
        return false;
    }
    item == needle
        || item
            .strip_prefix(needle.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Evaluates a filter query against task records.
#[derive(Debug)]
pub struct FilterEvaluator<'a> {
    query: &'a FilterQuery,
    context: &'a FilterContext<'a>,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates a new filter evaluator.
    pub fn new(query: &'a FilterQuery, context: &'a FilterContext<'a>) -> Self {
        Self { query, context }
    }

    /// Returns true if the task matches the query.
    pub fn matches(&self, task: &TaskRecord) -> bool {
        self.evaluate_group(&self.query.root, task)
    }

    /// Filters a slice of tasks, returning only those that match, in input order.
    pub fn filter_tasks<'b>(&self, tasks: &'b [TaskRecord]) -> Vec<&'b TaskRecord> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    /// Filters and sorts tasks using the query's sort key and direction.
    pub fn filter_and_sort<'b>(&self, tasks: &'b [TaskRecord]) -> Vec<&'b TaskRecord> {
        let mut matched = self.filter_tasks(tasks);
        sort_tasks(
            &mut matched,
            self.query.sort_key,
            self.query.sort_direction,
            self.context,
        );
        matched
    }

    /// Runs the full pipeline: filter, sort, then group (and subgroup).
    pub fn run<'b>(&self, tasks: &'b [TaskRecord]) -> Vec<TaskGroup<'b>> {
        let sorted = self.filter_and_sort(tasks);
        group_tasks(
            &sorted,
            &self.query.group_key,
            self.query.subgroup_key.as_ref(),
            self.context,
        )
    }

    /// Evaluates any node. Incomplete conditions evaluate to false.
    pub fn evaluate_node(&self, node: &FilterNode, task: &TaskRecord) -> bool {
        match node {
            FilterNode::Condition(condition) => self.evaluate_condition(condition, task),
            FilterNode::Group(group) => self.evaluate_group(group, task),
        }
    }

    /// Evaluates a group over its complete children only. A group with no
    /// complete children matches everything.
    fn evaluate_group(&self, group: &FilterGroup, task: &TaskRecord) -> bool {
        let user_fields = self.context.user_fields();
        let mut complete = group
            .children
            .iter()
            .filter(|child| child.is_complete_with(user_fields))
            .peekable();

        if complete.peek().is_none() {
            return true;
        }

        match group.conjunction {
            Conjunction::And => complete.all(|child| self.evaluate_node(child, task)),
            Conjunction::Or => complete.any(|child| self.evaluate_node(child, task)),
        }
    }

    fn evaluate_condition(&self, condition: &FilterCondition, task: &TaskRecord) -> bool {
        if !condition.is_complete_with(self.context.user_fields()) {
            return false;
        }
        let Some(property) = &condition.property else {
            return false;
        };
        let Some(definition) = property_definition(property, self.context.user_fields()) else {
            tracing::debug!(property = %property, "unknown filter property, condition does not match");
            return false;
        };
        if let FilterOperator::Unknown(op) = &condition.operator {
            tracing::debug!(operator = %op, "unknown filter operator, condition does not match");
            return false;
        }
        if !definition.supports(&condition.operator) {
            tracing::debug!(
                property = %property,
                operator = %condition.operator,
                "operator not supported by property, condition does not match"
            );
            return false;
        }

        let value = self.task_value(&definition, task);
        self.apply_operator(&definition, &condition.operator, &value, &condition.value)
    }

    /// Extracts the task's value for a property.
    fn task_value(&self, definition: &PropertyDefinition, task: &TaskRecord) -> TaskValue {
        match &definition.id {
            PropertyId::Title => TaskValue::text(&task.title),
            PropertyId::Path => TaskValue::text(&task.path),
            PropertyId::Status => TaskValue::text(&task.status),
            PropertyId::Priority => TaskValue::text(&task.priority),
            PropertyId::Tags => TaskValue::list(&task.tags),
            PropertyId::Contexts => TaskValue::list(&task.contexts),
            PropertyId::Projects => TaskValue::list(&task.projects),
            PropertyId::Due => TaskValue::date(task.due.as_deref()),
            PropertyId::Scheduled => TaskValue::date(task.scheduled.as_deref()),
            PropertyId::CompletedDate => TaskValue::date(task.completed_date.as_deref()),
            PropertyId::DateCreated => TaskValue::date(task.date_created.as_deref()),
            PropertyId::DateModified => TaskValue::date(task.date_modified.as_deref()),
            PropertyId::TimeEstimate => task
                .time_estimate
                .map_or(TaskValue::Missing, |m| TaskValue::Number(f64::from(m))),
            PropertyId::Recurrence => TaskValue::text(task.recurrence.as_deref().unwrap_or_default()),
            PropertyId::Archived => TaskValue::Bool(task.archived),
            PropertyId::StatusIsCompleted => {
                TaskValue::Bool(self.context.statuses().is_completed(&task.status))
            }
            PropertyId::User(id) => self.user_value(id, task),
            PropertyId::Unknown(_) => TaskValue::Missing,
        }
    }

    /// Reads a user-defined field from the task's custom storage, coerced to
    /// the field's kind.
    fn user_value(&self, field_id: &str, task: &TaskRecord) -> TaskValue {
        use serde_json::Value;

        let Some(field) = self.context.user_field(field_id) else {
            return TaskValue::Missing;
        };
        let Some(raw) = task.custom_value(&field.key) else {
            return TaskValue::Missing;
        };

        match (field.kind, raw) {
            (_, Value::Null) => TaskValue::Missing,
            (UserFieldKind::Text, Value::String(s)) => TaskValue::text(s),
            (UserFieldKind::Text, Value::Number(n)) => TaskValue::Text(n.to_string()),
            (UserFieldKind::Text, Value::Bool(b)) => TaskValue::Text(b.to_string()),
            (UserFieldKind::Number, Value::Number(n)) => {
                n.as_f64().map_or(TaskValue::Missing, TaskValue::Number)
            }
            (UserFieldKind::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_or(TaskValue::Missing, TaskValue::Number),
            (UserFieldKind::Date, Value::String(s)) => TaskValue::date(Some(s)),
            (UserFieldKind::Boolean, Value::Bool(b)) => TaskValue::Bool(*b),
            (UserFieldKind::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => TaskValue::Bool(true),
                "false" | "no" | "0" | "" => TaskValue::Bool(false),
                _ => TaskValue::Missing,
            },
            (UserFieldKind::List, Value::Array(items)) => {
                let items: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                TaskValue::list(&items)
            }
            (UserFieldKind::List, Value::String(s)) => {
                let items: Vec<String> = s.split(',').map(str::to_string).collect();
                TaskValue::list(&items)
            }
            _ => TaskValue::Missing,
        }
    }

    fn apply_operator(
        &self,
        definition: &PropertyDefinition,
        operator: &FilterOperator,
        value: &TaskValue,
        expected: &FilterValue,
    ) -> bool {
        match operator {
            FilterOperator::IsEmpty => return value.is_missing(),
            FilterOperator::IsNotEmpty => return !value.is_missing(),
            FilterOperator::IsChecked => return matches!(value, TaskValue::Bool(true)),
            FilterOperator::IsNotChecked => return !matches!(value, TaskValue::Bool(true)),
            _ => {}
        }

        if value.is_missing() {
            return operator.is_absence_check();
        }

        match operator {
            FilterOperator::Is => self.values_equal(definition.kind, value, expected),
            FilterOperator::IsNot => !self.values_equal(definition.kind, value, expected),
            FilterOperator::Contains => self.value_contains(value, expected),
            FilterOperator::DoesNotContain => !self.value_contains(value, expected),
            FilterOperator::IsBefore => self.compare_dates(value, expected, |a, b| a < b),
            FilterOperator::IsAfter => self.compare_dates(value, expected, |a, b| a > b),
            FilterOperator::IsOnOrBefore => self.compare_dates(value, expected, |a, b| a <= b),
            FilterOperator::IsOnOrAfter => self.compare_dates(value, expected, |a, b| a >= b),
            FilterOperator::IsGreaterThan => compare_numbers(value, expected, |a, b| a > b),
            FilterOperator::IsLessThan => compare_numbers(value, expected, |a, b| a < b),
            FilterOperator::IsGreaterThanOrEqual => {
                compare_numbers(value, expected, |a, b| a >= b - NUMBER_EPSILON)
            }
            FilterOperator::IsLessThanOrEqual => {
                compare_numbers(value, expected, |a, b| a <= b + NUMBER_EPSILON)
            }
            FilterOperator::IsEmpty
            | FilterOperator::IsNotEmpty
            | FilterOperator::IsChecked
            | FilterOperator::IsNotChecked
            | FilterOperator::Unknown(_) => false,
        }
    }

    fn values_equal(&self, kind: ValueKind, value: &TaskValue, expected: &FilterValue) -> bool {
        match (kind, value) {
            (ValueKind::Date, TaskValue::Date(date)) => expected
                .as_text()
                .and_then(|text| self.context.resolve_date(&text))
                .is_some_and(|wanted| *date == wanted),
            (_, TaskValue::Number(n)) => expected
                .as_number()
                .is_some_and(|wanted| (n - wanted).abs() < NUMBER_EPSILON),
            (ValueKind::Select, TaskValue::Text(text)) => {
                // Multi-value select conditions match any listed value.
                expected
                    .as_list()
                    .iter()
                    .any(|wanted| wanted.trim() == text.trim())
            }
            (_, TaskValue::Text(text)) => expected
                .as_text()
                .is_some_and(|wanted| wanted.to_lowercase() == text.trim().to_lowercase()),
            (_, TaskValue::Bool(b)) => expected
                .as_text()
                .is_some_and(|wanted| wanted.eq_ignore_ascii_case(&b.to_string())),
            _ => false,
        }
    }

    fn value_contains(&self, value: &TaskValue, expected: &FilterValue) -> bool {
        match value {
            TaskValue::List(items) => expected
                .as_list()
                .iter()
                .any(|needle| items.iter().any(|item| list_item_matches(item, needle))),
            TaskValue::Text(text) => {
                let haystack = text.to_lowercase();
                expected
                    .as_list()
                    .iter()
                    .any(|needle| haystack.contains(&needle.to_lowercase()))
            }
            _ => false,
        }
    }

    fn compare_dates(
        &self,
        value: &TaskValue,
        expected: &FilterValue,
        cmp: impl Fn(NaiveDate, NaiveDate) -> bool,
    ) -> bool {
        let TaskValue::Date(date) = value else {
            return false;
        };
        expected
            .as_text()
            .and_then(|text| self.context.resolve_date(&text))
            .is_some_and(|wanted| cmp(*date, wanted))
    }
}

fn compare_numbers(value: &TaskValue, expected: &FilterValue, cmp: impl Fn(f64, f64) -> bool) -> bool {
    let TaskValue::Number(n) = value else {
        return false;
    };
    expected.as_number().is_some_and(|wanted| cmp(*n, wanted))
}
