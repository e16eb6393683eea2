//! Saved views: named filter queries and the matcher that decides which one
//! is active for the query currently being edited.
//!
//! Matching is structural. Two queries match when their condition trees have
//! the same shape, conjunctions, properties, operators and values. Node ids
//! are ignored, so a query rebuilt from the same conditions (with fresh ids)
//! still selects its view. Sort and grouping keys are ignored as well.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::filter::{generate_node_id, FilterGroup, FilterNode, FilterQuery};
use crate::lookups::{find_view, LookupResult};

/// Id prefix of saved views.
pub const VIEW_ID_PREFIX: &str = "view_";

/// A named, persisted filter query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub id: String,
    pub name: String,
    /// A corrupt stored query loads as the empty query.
    #[serde(default, deserialize_with = "lenient_query")]
    pub query: FilterQuery,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_options: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_properties: Option<Vec<String>>,
}

fn lenient_query<'de, D: Deserializer<'de>>(deserializer: D) -> Result<FilterQuery, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(FilterQuery::from_value_lenient(value))
}

impl SavedView {
    /// Creates a view with a freshly generated id.
    pub fn new(name: impl Into<String>, query: FilterQuery) -> Self {
        Self {
            id: generate_node_id(VIEW_ID_PREFIX),
            name: name.into(),
            query,
            view_options: None,
            visible_properties: None,
        }
    }
}

fn nodes_match(a: &FilterNode, b: &FilterNode) -> bool {
    match (a, b) {
        (FilterNode::Condition(a), FilterNode::Condition(b)) => {
            a.property == b.property && a.operator == b.operator && a.value == b.value
        }
        (FilterNode::Group(a), FilterNode::Group(b)) => groups_match(a, b),
        _ => false,
    }
}

fn groups_match(a: &FilterGroup, b: &FilterGroup) -> bool {
    a.conjunction == b.conjunction
        && a.children.len() == b.children.len()
        && a.children
            .iter()
            .zip(&b.children)
            .all(|(x, y)| nodes_match(x, y))
}

/// Returns true if two queries filter identically.
///
/// Compares the condition trees node by node. Node ids and the sort and
/// grouping keys are ignored.
pub fn queries_match(a: &FilterQuery, b: &FilterQuery) -> bool {
    groups_match(&a.root, &b.root)
}

/// Returns the most recently created view whose query matches `query`.
pub fn active_view<'a>(views: &'a [SavedView], query: &FilterQuery) -> Option<&'a SavedView> {
    views.iter().rev().find(|v| queries_match(&v.query, query))
}

/// Ordered collection of saved views (creation order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedViews {
    views: Vec<SavedView>,
}

impl SavedViews {
    pub fn new(views: Vec<SavedView>) -> Self {
        Self { views }
    }

    pub fn as_slice(&self) -> &[SavedView] {
        &self.views
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SavedView> {
        self.views.iter()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Saves `query` under `name`, appending a new view.
    pub fn save(&mut self, name: impl Into<String>, query: FilterQuery) -> &SavedView {
        let view = SavedView::new(name, query);
        tracing::debug!(id = %view.id, name = %view.name, "saved view");
        self.views.push(view);
        &self.views[self.views.len() - 1]
    }

    /// Removes the view with id `id`, returning it.
    pub fn delete(&mut self, id: &str) -> Option<SavedView> {
        let index = self.views.iter().position(|v| v.id == id)?;
        Some(self.views.remove(index))
    }

    /// Finds a view by name or id, suggesting a close name on a miss.
    pub fn find_by_name(&self, name: &str) -> LookupResult<&SavedView> {
        find_view(&self.views, name)
    }

    /// The view matching `query`, if any.
    pub fn active(&self, query: &FilterQuery) -> Option<&SavedView> {
        active_view(&self.views, query)
    }

    pub fn into_inner(self) -> Vec<SavedView> {
        self.views
    }
}

impl From<Vec<SavedView>> for SavedViews {
    fn from(views: Vec<SavedView>) -> Self {
        Self::new(views)
    }
}

impl<'a> IntoIterator for &'a SavedViews {
    type Item = &'a SavedView;
    type IntoIter = std::slice::Iter<'a, SavedView>;

    fn into_iter(self) -> Self::IntoIter {
        self.views.iter()
    }
}
