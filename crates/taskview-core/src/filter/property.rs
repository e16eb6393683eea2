//! Filterable properties and their operators.
//!
//! The property set is closed: every built-in property declares the value kind
//! its conditions take and the operators it supports. User-defined fields are
//! addressed as `user:<fieldId>` and borrow the operator set of their kind.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use taskview_model::models::{
    PriorityRegistry, StatusRegistry, TaskRecord, UserFieldDefinition, UserFieldKind,
};

/// Prefix of user-defined property ids.
pub const USER_PROPERTY_PREFIX: &str = "user:";

/// Identifier of a filterable property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyId {
    Title,
    Path,
    Status,
    Priority,
    Tags,
    Contexts,
    Projects,
    Due,
    Scheduled,
    CompletedDate,
    DateCreated,
    DateModified,
    TimeEstimate,
    Recurrence,
    Archived,
    /// Whether the task's status is a completed one.
    StatusIsCompleted,
    /// A user-defined field, by field id.
    User(String),
    /// An id this build does not know about.
    Unknown(String),
}

impl PropertyId {
    /// Every built-in property, in display order.
    pub const BUILTIN: [PropertyId; 16] = [
        PropertyId::Title,
        PropertyId::Status,
        PropertyId::Priority,
        PropertyId::Tags,
        PropertyId::Contexts,
        PropertyId::Projects,
        PropertyId::Due,
        PropertyId::Scheduled,
        PropertyId::CompletedDate,
        PropertyId::DateCreated,
        PropertyId::DateModified,
        PropertyId::TimeEstimate,
        PropertyId::Recurrence,
        PropertyId::Archived,
        PropertyId::StatusIsCompleted,
        PropertyId::Path,
    ];

    /// Returns the user field id for `user:<id>` properties.
    pub fn user_field_id(&self) -> Option<&str> {
        match self {
            PropertyId::User(id) => Some(id),
            _ => None,
        }
    }
}

impl From<&str> for PropertyId {
    fn from(value: &str) -> Self {
        match value {
            "title" => PropertyId::Title,
            "path" => PropertyId::Path,
            "status" => PropertyId::Status,
            "priority" => PropertyId::Priority,
            "tags" => PropertyId::Tags,
            "contexts" => PropertyId::Contexts,
            "projects" => PropertyId::Projects,
            "due" => PropertyId::Due,
            "scheduled" => PropertyId::Scheduled,
            "completedDate" => PropertyId::CompletedDate,
            "dateCreated" => PropertyId::DateCreated,
            "dateModified" => PropertyId::DateModified,
            "timeEstimate" => PropertyId::TimeEstimate,
            "recurrence" => PropertyId::Recurrence,
            "archived" => PropertyId::Archived,
            "status.isCompleted" => PropertyId::StatusIsCompleted,
            other => match other.strip_prefix(USER_PROPERTY_PREFIX) {
                Some(id) if !id.is_empty() => PropertyId::User(id.to_string()),
                _ => PropertyId::Unknown(other.to_string()),
            },
        }
    }
}

impl From<String> for PropertyId {
    fn from(value: String) -> Self {
        PropertyId::from(value.as_str())
    }
}

impl From<PropertyId> for String {
    fn from(value: PropertyId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            PropertyId::Title => "title",
            PropertyId::Path => "path",
            PropertyId::Status => "status",
            PropertyId::Priority => "priority",
            PropertyId::Tags => "tags",
            PropertyId::Contexts => "contexts",
            PropertyId::Projects => "projects",
            PropertyId::Due => "due",
            PropertyId::Scheduled => "scheduled",
            PropertyId::CompletedDate => "completedDate",
            PropertyId::DateCreated => "dateCreated",
            PropertyId::DateModified => "dateModified",
            PropertyId::TimeEstimate => "timeEstimate",
            PropertyId::Recurrence => "recurrence",
            PropertyId::Archived => "archived",
            PropertyId::StatusIsCompleted => "status.isCompleted",
            PropertyId::User(id) => return write!(f, "{USER_PROPERTY_PREFIX}{id}"),
            PropertyId::Unknown(id) => id,
        };
        f.write_str(id)
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    IsBefore,
    IsAfter,
    IsOnOrBefore,
    IsOnOrAfter,
    IsEmpty,
    IsNotEmpty,
    IsChecked,
    IsNotChecked,
    IsGreaterThan,
    IsLessThan,
    IsGreaterThanOrEqual,
    IsLessThanOrEqual,
    Unknown(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Is => "is",
            FilterOperator::IsNot => "is-not",
            FilterOperator::Contains => "contains",
            FilterOperator::DoesNotContain => "does-not-contain",
            FilterOperator::IsBefore => "is-before",
            FilterOperator::IsAfter => "is-after",
            FilterOperator::IsOnOrBefore => "is-on-or-before",
            FilterOperator::IsOnOrAfter => "is-on-or-after",
            FilterOperator::IsEmpty => "is-empty",
            FilterOperator::IsNotEmpty => "is-not-empty",
            FilterOperator::IsChecked => "is-checked",
            FilterOperator::IsNotChecked => "is-not-checked",
            FilterOperator::IsGreaterThan => "is-greater-than",
            FilterOperator::IsLessThan => "is-less-than",
            FilterOperator::IsGreaterThanOrEqual => "is-greater-than-or-equal",
            FilterOperator::IsLessThanOrEqual => "is-less-than-or-equal",
            FilterOperator::Unknown(op) => op,
        }
    }

    /// Returns false for unary operators that take no value.
    pub fn requires_value(&self) -> bool {
        !matches!(
            self,
            FilterOperator::IsEmpty
                | FilterOperator::IsNotEmpty
                | FilterOperator::IsChecked
                | FilterOperator::IsNotChecked
        )
    }

    /// Returns true for operators that hold when the task has no value.
    pub fn is_absence_check(&self) -> bool {
        matches!(
            self,
            FilterOperator::IsEmpty
                | FilterOperator::IsNot
                | FilterOperator::DoesNotContain
                | FilterOperator::IsNotChecked
        )
    }
}

impl From<&str> for FilterOperator {
    fn from(value: &str) -> Self {
        match value {
            "is" => FilterOperator::Is,
            "is-not" => FilterOperator::IsNot,
            "contains" => FilterOperator::Contains,
            "does-not-contain" => FilterOperator::DoesNotContain,
            "is-before" => FilterOperator::IsBefore,
            "is-after" => FilterOperator::IsAfter,
            "is-on-or-before" => FilterOperator::IsOnOrBefore,
            "is-on-or-after" => FilterOperator::IsOnOrAfter,
            "is-empty" => FilterOperator::IsEmpty,
            "is-not-empty" => FilterOperator::IsNotEmpty,
            "is-checked" => FilterOperator::IsChecked,
            "is-not-checked" => FilterOperator::IsNotChecked,
            "is-greater-than" => FilterOperator::IsGreaterThan,
            "is-less-than" => FilterOperator::IsLessThan,
            "is-greater-than-or-equal" => FilterOperator::IsGreaterThanOrEqual,
            "is-less-than-or-equal" => FilterOperator::IsLessThanOrEqual,
            other => FilterOperator::Unknown(other.to_string()),
        }
    }
}

impl From<String> for FilterOperator {
    fn from(value: String) -> Self {
        FilterOperator::from(value.as_str())
    }
}

impl From<FilterOperator> for String {
    fn from(value: FilterOperator) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the value a condition takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    /// One value out of a registry.
    Select,
    /// Membership in a list-valued property.
    MultiSelect,
    Date,
    Number,
    Boolean,
}

static TEXT_OPERATORS: [FilterOperator; 6] = [
    FilterOperator::Is,
    FilterOperator::IsNot,
    FilterOperator::Contains,
    FilterOperator::DoesNotContain,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

static SELECT_OPERATORS: [FilterOperator; 4] = [
    FilterOperator::Is,
    FilterOperator::IsNot,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

static LIST_OPERATORS: [FilterOperator; 4] = [
    FilterOperator::Contains,
    FilterOperator::DoesNotContain,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

static DATE_OPERATORS: [FilterOperator; 8] = [
    FilterOperator::Is,
    FilterOperator::IsNot,
    FilterOperator::IsBefore,
    FilterOperator::IsAfter,
    FilterOperator::IsOnOrBefore,
    FilterOperator::IsOnOrAfter,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

static NUMBER_OPERATORS: [FilterOperator; 8] = [
    FilterOperator::Is,
    FilterOperator::IsNot,
    FilterOperator::IsGreaterThan,
    FilterOperator::IsLessThan,
    FilterOperator::IsGreaterThanOrEqual,
    FilterOperator::IsLessThanOrEqual,
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
];

static BOOLEAN_OPERATORS: [FilterOperator; 2] =
    [FilterOperator::IsChecked, FilterOperator::IsNotChecked];

static RECURRENCE_OPERATORS: [FilterOperator; 4] = [
    FilterOperator::IsEmpty,
    FilterOperator::IsNotEmpty,
    FilterOperator::Contains,
    FilterOperator::DoesNotContain,
];

/// Description of one filterable property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    pub id: PropertyId,
    pub label: String,
    pub kind: ValueKind,
    pub operators: &'static [FilterOperator],
}

impl PropertyDefinition {
    fn builtin(id: PropertyId) -> Option<Self> {
        let (label, kind, operators): (&str, ValueKind, &'static [FilterOperator]) = match id {
            PropertyId::Title => ("Title", ValueKind::Text, &TEXT_OPERATORS),
            PropertyId::Path => ("Path", ValueKind::Text, &TEXT_OPERATORS),
            PropertyId::Status => ("Status", ValueKind::Select, &SELECT_OPERATORS),
            PropertyId::Priority => ("Priority", ValueKind::Select, &SELECT_OPERATORS),
            PropertyId::Tags => ("Tags", ValueKind::MultiSelect, &LIST_OPERATORS),
            PropertyId::Contexts => ("Contexts", ValueKind::MultiSelect, &LIST_OPERATORS),
            PropertyId::Projects => ("Projects", ValueKind::MultiSelect, &LIST_OPERATORS),
            PropertyId::Due => ("Due date", ValueKind::Date, &DATE_OPERATORS),
            PropertyId::Scheduled => ("Scheduled date", ValueKind::Date, &DATE_OPERATORS),
            PropertyId::CompletedDate => ("Completed date", ValueKind::Date, &DATE_OPERATORS),
            PropertyId::DateCreated => ("Created date", ValueKind::Date, &DATE_OPERATORS),
            PropertyId::DateModified => ("Modified date", ValueKind::Date, &DATE_OPERATORS),
            PropertyId::TimeEstimate => ("Time estimate", ValueKind::Number, &NUMBER_OPERATORS),
            PropertyId::Recurrence => ("Recurrence", ValueKind::Text, &RECURRENCE_OPERATORS),
            PropertyId::Archived => ("Archived", ValueKind::Boolean, &BOOLEAN_OPERATORS),
            PropertyId::StatusIsCompleted => {
                ("Completed", ValueKind::Boolean, &BOOLEAN_OPERATORS)
            }
            PropertyId::User(_) | PropertyId::Unknown(_) => return None,
        };
        Some(Self {
            id,
            label: label.to_string(),
            kind,
            operators,
        })
    }

    fn user(field: &UserFieldDefinition) -> Self {
        let kind = value_kind_for_field(field.kind);
        Self {
            id: PropertyId::User(field.id.clone()),
            label: field.display_name.clone(),
            kind,
            operators: operators_for_kind(kind),
        }
    }

    /// Returns true if `operator` is allowed on this property.
    pub fn supports(&self, operator: &FilterOperator) -> bool {
        self.operators.contains(operator)
    }
}

/// Maps a user field kind onto the condition value kind.
pub fn value_kind_for_field(kind: UserFieldKind) -> ValueKind {
    match kind {
        UserFieldKind::Text => ValueKind::Text,
        UserFieldKind::Number => ValueKind::Number,
        UserFieldKind::Date => ValueKind::Date,
        UserFieldKind::Boolean => ValueKind::Boolean,
        UserFieldKind::List => ValueKind::MultiSelect,
    }
}

/// Returns the operator set of a value kind.
pub fn operators_for_kind(kind: ValueKind) -> &'static [FilterOperator] {
    match kind {
        ValueKind::Text => &TEXT_OPERATORS,
        ValueKind::Select => &SELECT_OPERATORS,
        ValueKind::MultiSelect => &LIST_OPERATORS,
        ValueKind::Date => &DATE_OPERATORS,
        ValueKind::Number => &NUMBER_OPERATORS,
        ValueKind::Boolean => &BOOLEAN_OPERATORS,
    }
}

/// Resolves a property id into its definition.
///
/// Returns `None` for unknown ids and for `user:` ids with no matching field.
pub fn property_definition(
    id: &PropertyId,
    user_fields: &[UserFieldDefinition],
) -> Option<PropertyDefinition> {
    match id {
        PropertyId::User(field_id) => user_fields
            .iter()
            .find(|f| f.id == *field_id)
            .map(PropertyDefinition::user),
        PropertyId::Unknown(_) => None,
        builtin => PropertyDefinition::builtin(builtin.clone()),
    }
}

/// Returns every property available for filtering: built-ins followed by
/// user-defined fields.
pub fn available_properties(user_fields: &[UserFieldDefinition]) -> Vec<PropertyDefinition> {
    PropertyId::BUILTIN
        .iter()
        .cloned()
        .filter_map(PropertyDefinition::builtin)
        .chain(user_fields.iter().map(PropertyDefinition::user))
        .collect()
}

/// A selectable value for select-kind properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Option lists offered for select-kind properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub statuses: Vec<SelectOption>,
    pub priorities: Vec<SelectOption>,
    pub tags: Vec<String>,
    pub contexts: Vec<String>,
    pub projects: Vec<String>,
}

impl FilterOptions {
    /// Builds option lists from the registries and the values observed on
    /// `tasks`. Observed values are de-duplicated and sorted.
    pub fn collect(
        tasks: &[TaskRecord],
        statuses: &StatusRegistry,
        priorities: &PriorityRegistry,
    ) -> Self {
        let mut tags = BTreeSet::new();
        let mut contexts = BTreeSet::new();
        let mut projects = BTreeSet::new();
        for task in tasks {
            tags.extend(task.tags.iter().map(|t| t.trim().to_string()));
            contexts.extend(task.contexts.iter().map(|c| c.trim().to_string()));
            projects.extend(task.projects.iter().map(|p| p.trim().to_string()));
        }
        let non_empty = |set: BTreeSet<String>| set.into_iter().filter(|s| !s.is_empty()).collect();

        Self {
            statuses: statuses
                .statuses()
                .iter()
                .map(|s| SelectOption {
                    value: s.value.clone(),
                    label: s.label.clone(),
                })
                .collect(),
            priorities: priorities
                .priorities()
                .iter()
                .map(|p| SelectOption {
                    value: p.value.clone(),
                    label: p.label.clone(),
                })
                .collect(),
            tags: non_empty(tags),
            contexts: non_empty(contexts),
            projects: non_empty(projects),
        }
    }
}
