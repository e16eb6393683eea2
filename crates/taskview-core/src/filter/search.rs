//! Quick-search term splicing.
//!
//! The search box does not edit the user's query tree directly. Instead a
//! dedicated condition (`title contains <term>`, id prefixed with
//! [`SEARCH_ID_PREFIX`]) is kept as the first child of the root group, and
//! the user's own filters are moved, unmodified, into one wrapper group next
//! to it. The root conjunction is forced to `and` while a search is active so
//! the term always narrows the result.
//!
//! Removing the term reverses the splice exactly: if a single group remains
//! under the root, its children and conjunction replace the root's.

use super::property::{FilterOperator, PropertyId};
use super::query::{
    generate_node_id, Conjunction, FilterCondition, FilterGroup, FilterNode, FilterQuery,
    FilterValue, GROUP_ID_PREFIX, SEARCH_ID_PREFIX,
};

fn is_search_node(node: &FilterNode) -> bool {
    matches!(node, FilterNode::Condition(c) if c.id.starts_with(SEARCH_ID_PREFIX))
}

/// Returns the search term currently spliced into `query`, if any.
pub fn search_term(query: &FilterQuery) -> Option<&str> {
    query.root.children.iter().find_map(|node| match node {
        FilterNode::Condition(c) if c.id.starts_with(SEARCH_ID_PREFIX) => match &c.value {
            FilterValue::Text(text) => Some(text.as_str()),
            _ => None,
        },
        _ => None,
    })
}

/// Returns a copy of `query` with the search condition removed and the
/// wrapper group un-nested.
pub fn strip_search(query: &FilterQuery) -> FilterQuery {
    let mut stripped = query.clone();
    let before = stripped.root.children.len();
    stripped.root.children.retain(|node| !is_search_node(node));
    if stripped.root.children.len() == before {
        return stripped;
    }

    if let [FilterNode::Group(_)] = stripped.root.children.as_slice() {
        if let Some(FilterNode::Group(wrapper)) = stripped.root.children.pop() {
            stripped.root.conjunction = wrapper.conjunction;
            stripped.root.children = wrapper.children;
        }
    }
    stripped
}

/// Returns a copy of `query` with its search condition set to `term`.
///
/// The input query is never modified. Any previous search condition is
/// removed first, so applying the same term twice yields the same shape as
/// applying it once. A blank term only removes. The term is trimmed and
/// matched case-insensitively against task titles.
pub fn set_search_term(query: &FilterQuery, term: &str) -> FilterQuery {
    let mut updated = strip_search(query);
    let term = term.trim();
    if term.is_empty() {
        return updated;
    }

    let search = FilterNode::Condition(FilterCondition {
        id: generate_node_id(SEARCH_ID_PREFIX),
        property: Some(PropertyId::Title),
        operator: FilterOperator::Contains,
        value: FilterValue::Text(term.to_string()),
    });

    let existing = std::mem::take(&mut updated.root.children);
    if existing.is_empty() {
        updated.root.children.push(search);
        return updated;
    }

    let wrapper = FilterGroup {
        id: generate_node_id(GROUP_ID_PREFIX),
        conjunction: updated.root.conjunction,
        children: existing,
    };
    updated.root.conjunction = Conjunction::And;
    updated.root.children = vec![search, FilterNode::Group(wrapper)];
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterContext, FilterEvaluator};
    use taskview_model::models::{PriorityRegistry, StatusRegistry, TaskRecord};

    fn status_is(value: &str) -> FilterNode {
        FilterCondition::new(PropertyId::Status, FilterOperator::Is, value).into()
    }

    fn or_query() -> FilterQuery {
        let mut query = FilterQuery::default();
        query.root.conjunction = Conjunction::Or;
        query.root.children.push(status_is("open"));
        query.root.children.push(status_is("done"));
        query
    }

    #[test]
    fn test_search_on_empty_query_is_single_child() {
        let query = FilterQuery::default();
        let searched = set_search_term(&query, "milk");
        assert_eq!(searched.root.children.len(), 1);
        assert_eq!(searched.root.conjunction, Conjunction::And);
        assert_eq!(search_term(&searched), Some("milk"));
    }

    #[test]
    fn test_search_wraps_existing_filters() {
        let query = or_query();
        let searched = set_search_term(&query, "milk");

        assert_eq!(searched.root.conjunction, Conjunction::And);
        assert_eq!(searched.root.children.len(), 2);
        assert!(searched.root.children[0].id().starts_with(SEARCH_ID_PREFIX));
        let FilterNode::Group(wrapper) = &searched.root.children[1] else {
            panic!("expected wrapper group");
        };
        assert_eq!(wrapper.conjunction, Conjunction::Or);
        assert_eq!(wrapper.children, query.root.children);
    }

    #[test]
    fn test_set_search_term_does_not_mutate_input() {
        let query = or_query();
        let before = query.clone();
        let _ = set_search_term(&query, "milk");
        assert_eq!(query, before);
    }

    #[test]
    fn test_add_then_remove_restores_original() {
        for query in [FilterQuery::default(), or_query()] {
            let searched = set_search_term(&query, "milk");
            assert_eq!(set_search_term(&searched, ""), query);
        }

        // A lone group child survives the round trip as-is.
        let mut nested = FilterQuery::default();
        nested
            .root
            .children
            .push(FilterGroup::new(Conjunction::Or).with_child(status_is("open")).into());
        let searched = set_search_term(&nested, "milk");
        assert_eq!(set_search_term(&searched, "   "), nested);
    }

    #[test]
    fn test_setting_term_twice_keeps_shape() {
        let query = or_query();
        let once = set_search_term(&query, "milk");
        let twice = set_search_term(&once, "bread");

        let searches = twice.root.children.iter().filter(|n| is_search_node(n)).count();
        assert_eq!(searches, 1);
        assert_eq!(twice.root.children.len(), 2);
        assert_eq!(search_term(&twice), Some("bread"));

        let FilterNode::Group(wrapper) = &twice.root.children[1] else {
            panic!("expected wrapper group");
        };
        assert_eq!(wrapper.children, query.root.children);
        assert_eq!(wrapper.conjunction, Conjunction::Or);
    }

    #[test]
    fn test_term_is_trimmed() {
        let searched = set_search_term(&FilterQuery::default(), "  bread ");
        assert_eq!(search_term(&searched), Some("bread"));
    }

    #[test]
    fn test_search_narrows_or_root() {
        let statuses = StatusRegistry::default();
        let priorities = PriorityRegistry::default();
        let context = FilterContext::new(&statuses, &priorities, &[]);

        let searched = set_search_term(&or_query(), "Milk");
        let evaluator = FilterEvaluator::new(&searched, &context);

        let mut milk = TaskRecord::new("a.md", "Buy milk");
        milk.status = "done".to_string();
        let bread = TaskRecord::new("b.md", "Buy bread");
        let mut other_milk = TaskRecord::new("c.md", "Milk the cow");
        other_milk.status = "in-progress".to_string();

        assert!(evaluator.matches(&milk));
        assert!(!evaluator.matches(&bread));
        assert!(!evaluator.matches(&other_milk));
    }

    #[test]
    fn test_strip_without_search_is_identity() {
        let mut query = FilterQuery::default();
        query
            .root
            .children
            .push(FilterGroup::new(Conjunction::Or).with_child(status_is("open")).into());
        assert_eq!(strip_search(&query), query);
    }
}
