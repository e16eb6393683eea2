//! The filter query tree.
//!
//! A [`FilterQuery`] is a root [`FilterGroup`] plus presentation keys (sort,
//! group, subgroup). Groups hold an ordered list of [`FilterNode`]s, each of
//! which is either a leaf [`FilterCondition`] or a nested group.
//!
//! Conditions may be incomplete while a user is still building them: no
//! property yet, or a value-taking operator with an empty value. Incomplete
//! conditions are ignored during evaluation rather than failing it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use taskview_model::date::parse_calendar_date;
use taskview_model::models::UserFieldDefinition;
use uuid::Uuid;

use super::error::{FilterError, FilterResult};
use super::evaluator::parse_relative_date;
use super::property::{property_definition, FilterOperator, PropertyId, ValueKind};

/// Id of the root group of freshly built queries.
pub const ROOT_GROUP_ID: &str = "root";

/// Id prefix for generated groups.
pub const GROUP_ID_PREFIX: &str = "group_";

/// Id prefix for generated conditions.
pub const CONDITION_ID_PREFIX: &str = "condition_";

/// Id prefix that marks the condition spliced in by the quick-search box.
pub const SEARCH_ID_PREFIX: &str = "search_";

/// Generates a unique node id with the given prefix.
pub fn generate_node_id(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

/// Logical connective of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

/// Value carried by a condition.
///
/// Scalars arrive as strings, numbers or booleans; multi-select conditions may
/// carry a list of strings. Absent values are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    #[default]
    None,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FilterValue {
    /// Returns true for `None`, blank strings and lists without a non-blank entry.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::None => true,
            FilterValue::Bool(_) | FilterValue::Number(_) => false,
            FilterValue::Text(text) => text.trim().is_empty(),
            FilterValue::List(items) => items.iter().all(|i| i.trim().is_empty()),
        }
    }

    /// Returns the value as text. Numbers and booleans are rendered.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FilterValue::None | FilterValue::List(_) => None,
            FilterValue::Bool(b) => Some(b.to_string()),
            FilterValue::Number(n) => Some(format_number(*n)),
            FilterValue::Text(text) => Some(text.trim().to_string()),
        }
    }

    /// Returns the value as a number, parsing numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => Some(*n),
            FilterValue::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Returns the non-blank entries of the value, treating a scalar as a
    /// one-element list.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            FilterValue::List(items) => items
                .iter()
                .map(|i| i.trim())
                .filter(|i| !i.is_empty())
                .map(str::to_string)
                .collect(),
            other => other.as_text().filter(|t| !t.is_empty()).into_iter().collect(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(value: Vec<String>) -> Self {
        FilterValue::List(value)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A leaf predicate: `property operator value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub id: String,
    /// `None` until the user picks a property. Serialized as `""`.
    #[serde(default, with = "blank_property")]
    pub property: Option<PropertyId>,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: FilterValue,
}

impl FilterCondition {
    /// Creates a condition with a generated id.
    pub fn new(property: PropertyId, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            id: generate_node_id(CONDITION_ID_PREFIX),
            property: Some(property),
            operator,
            value: value.into(),
        }
    }

    /// Creates a unary condition (no value) with a generated id.
    pub fn unary(property: PropertyId, operator: FilterOperator) -> Self {
        Self::new(property, operator, FilterValue::None)
    }

    /// Returns true if the condition can be evaluated.
    ///
    /// A condition is complete when it names a property and either its
    /// operator takes no value or its value is non-empty and fits the
    /// property's kind: dates must resolve, numbers must parse. User fields
    /// are looked up in `user_fields` to find their kind; unresolvable
    /// properties only need a non-empty value.
    pub fn is_complete_with(&self, user_fields: &[UserFieldDefinition]) -> bool {
        let Some(property) = &self.property else {
            return false;
        };
        if !self.operator.requires_value() {
            return true;
        }
        if self.value.is_empty() {
            return false;
        }
        match property_definition(property, user_fields).map(|d| d.kind) {
            Some(ValueKind::Date) => self.value.as_text().is_some_and(|text| {
                parse_relative_date(&text).is_some() || parse_calendar_date(&text).is_some()
            }),
            Some(ValueKind::Number) => self.value.as_number().is_some(),
            _ => true,
        }
    }
}

/// An ordered list of nodes joined by a conjunction.
///
/// `conjunction` and `children` are required on the wire; a group missing
/// either is malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub id: String,
    pub conjunction: Conjunction,
    pub children: Vec<FilterNode>,
}

impl FilterGroup {
    /// Creates an empty group with a generated id.
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            id: generate_node_id(GROUP_ID_PREFIX),
            conjunction,
            children: Vec::new(),
        }
    }

    /// Appends a child and returns the group, for building trees inline.
    pub fn with_child(mut self, child: impl Into<FilterNode>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterNode {
    Condition(FilterCondition),
    Group(FilterGroup),
}

impl FilterNode {
    pub fn id(&self) -> &str {
        match self {
            FilterNode::Condition(c) => &c.id,
            FilterNode::Group(g) => &g.id,
        }
    }

    /// Context-free completeness. See [`FilterNode::is_complete_with`].
    pub fn is_complete(&self) -> bool {
        self.is_complete_with(&[])
    }

    /// Returns true if the node participates in evaluation.
    ///
    /// A group is complete when it has no children or at least one complete
    /// descendant.
    pub fn is_complete_with(&self, user_fields: &[UserFieldDefinition]) -> bool {
        match self {
            FilterNode::Condition(c) => c.is_complete_with(user_fields),
            FilterNode::Group(g) => {
                g.children.is_empty() || g.children.iter().any(|c| c.is_complete_with(user_fields))
            }
        }
    }

    /// Returns true if any condition beneath (or at) this node is complete.
    fn has_complete_condition(&self, user_fields: &[UserFieldDefinition]) -> bool {
        match self {
            FilterNode::Condition(c) => c.is_complete_with(user_fields),
            FilterNode::Group(g) => g.children.iter().any(|c| c.has_complete_condition(user_fields)),
        }
    }
}

impl From<FilterCondition> for FilterNode {
    fn from(value: FilterCondition) -> Self {
        FilterNode::Condition(value)
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(value: FilterGroup) -> Self {
        FilterNode::Group(value)
    }
}

/// Sort key of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "due")]
    Due,
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "priority")]
    Priority,
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "dateCreated")]
    DateCreated,
    #[serde(rename = "completedDate")]
    CompletedDate,
    #[serde(rename = "none")]
    None,
}

/// Sort direction of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Grouping key of a query.
///
/// Unknown keys read as [`GroupKey::None`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GroupKey {
    #[default]
    None,
    Status,
    Priority,
    Context,
    Project,
    Tags,
    Due,
    Scheduled,
    /// A user-defined field, by field id.
    User(String),
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        match value {
            "none" | "" => GroupKey::None,
            "status" => GroupKey::Status,
            "priority" => GroupKey::Priority,
            "context" => GroupKey::Context,
            "project" => GroupKey::Project,
            "tags" => GroupKey::Tags,
            "due" => GroupKey::Due,
            "scheduled" => GroupKey::Scheduled,
            other => match PropertyId::from(other) {
                PropertyId::User(id) => GroupKey::User(id),
                _ => {
                    tracing::debug!(key = other, "unknown group key, not grouping");
                    GroupKey::None
                }
            },
        }
    }
}

impl From<String> for GroupKey {
    fn from(value: String) -> Self {
        GroupKey::from(value.as_str())
    }
}

impl From<GroupKey> for String {
    fn from(value: GroupKey) -> Self {
        value.to_string()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::None => f.write_str("none"),
            GroupKey::Status => f.write_str("status"),
            GroupKey::Priority => f.write_str("priority"),
            GroupKey::Context => f.write_str("context"),
            GroupKey::Project => f.write_str("project"),
            GroupKey::Tags => f.write_str("tags"),
            GroupKey::Due => f.write_str("due"),
            GroupKey::Scheduled => f.write_str("scheduled"),
            GroupKey::User(id) => write!(f, "{}", PropertyId::User(id.clone())),
        }
    }
}

/// A complete filter query: root group plus presentation keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterQuery {
    #[serde(flatten)]
    pub root: FilterGroup,
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default)]
    pub group_key: GroupKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgroup_key: Option<GroupKey>,
}

impl Default for FilterQuery {
    /// An empty `and` root that matches every task, sorted by due date.
    fn default() -> Self {
        Self {
            root: FilterGroup {
                id: ROOT_GROUP_ID.to_string(),
                conjunction: Conjunction::And,
                children: Vec::new(),
            },
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
            group_key: GroupKey::default(),
            subgroup_key: None,
        }
    }
}

impl FilterQuery {
    /// Parses a query, failing on malformed JSON or a malformed root.
    pub fn from_json(json: &str) -> FilterResult<Self> {
        serde_json::from_str(json).map_err(FilterError::malformed)
    }

    /// Parses a query, falling back to an empty default query when the input
    /// is malformed.
    pub fn from_json_lenient(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "malformed filter query, using an empty query");
            Self::default()
        })
    }

    /// Converts an already-parsed JSON value, falling back like
    /// [`FilterQuery::from_json_lenient`].
    pub fn from_value_lenient(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "malformed filter query, using an empty query");
            Self::default()
        })
    }

    /// Serializes the query to JSON.
    pub fn to_json(&self) -> FilterResult<String> {
        serde_json::to_string(self).map_err(FilterError::malformed)
    }

    /// Returns true if the query filters anything: the root has no children
    /// (matches all, intentionally) or at least one complete condition exists
    /// anywhere in the tree.
    ///
    /// User-field conditions are only checked against their declared kind
    /// through [`FilterQuery::is_meaningful_with`].
    pub fn is_meaningful(&self) -> bool {
        self.is_meaningful_with(&[])
    }

    /// Like [`FilterQuery::is_meaningful`], resolving user fields by `user_fields`.
    pub fn is_meaningful_with(&self, user_fields: &[UserFieldDefinition]) -> bool {
        self.root.children.is_empty()
            || self
                .root
                .children
                .iter()
                .any(|c| c.has_complete_condition(user_fields))
    }

    /// Returns true if the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Appends `node` to the group with id `group_id` (the root included).
    pub fn add_node(&mut self, group_id: &str, node: FilterNode) -> FilterResult<()> {
        let group = find_group_mut(&mut self.root, group_id)
            .ok_or_else(|| FilterError::group_not_found(group_id))?;
        group.children.push(node);
        Ok(())
    }

    /// Removes the node with id `id` anywhere below the root.
    ///
    /// Returns true if a node was removed.
    pub fn remove_node(&mut self, id: &str) -> bool {
        remove_from_group(&mut self.root, id)
    }
}

fn find_group_mut<'a>(group: &'a mut FilterGroup, id: &str) -> Option<&'a mut FilterGroup> {
    if group.id == id {
        return Some(group);
    }
    group.children.iter_mut().find_map(|child| match child {
        FilterNode::Group(g) => find_group_mut(g, id),
        FilterNode::Condition(_) => None,
    })
}

fn remove_from_group(group: &mut FilterGroup, id: &str) -> bool {
    let before = group.children.len();
    group.children.retain(|child| child.id() != id);
    if group.children.len() != before {
        return true;
    }
    group.children.iter_mut().any(|child| match child {
        FilterNode::Group(g) => remove_from_group(g, id),
        FilterNode::Condition(_) => false,
    })
}

mod blank_property {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<PropertyId>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(property) => serializer.collect_str(property),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PropertyId>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| PropertyId::from(trimmed))
        }))
    }
}
