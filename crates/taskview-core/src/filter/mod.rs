//! Structured task filters.
//!
//! A filter is a tree of conditions joined by `and`/`or` groups, stored as a
//! [`FilterQuery`] together with sort and grouping keys. This module provides
//! the tree model, the property/operator registry, the evaluator, sorting,
//! grouping and the quick-search splice.
//!
//! # Properties
//!
//! | Property | Kind |
//! |----------|------|
//! | `title`, `path` | text |
//! | `status`, `priority` | select |
//! | `tags`, `contexts`, `projects` | list |
//! | `due`, `scheduled`, `completedDate`, `dateCreated`, `dateModified` | date |
//! | `timeEstimate` | number |
//! | `recurrence` | text |
//! | `archived`, `status.isCompleted` | boolean |
//! | `user:<fieldId>` | kind of the user field |
//!
//! Date values accept `YYYY-MM-DD` and the relative tokens `today`,
//! `tomorrow`, `yesterday`, `next-week`, `last-week`, `in-<n>-days` and
//! `<n>-days-ago`.
//!
//! # Example
//!
//! ```
//! use taskview_core::filter::{
//!     Conjunction, FilterCondition, FilterContext, FilterEvaluator, FilterOperator,
//!     FilterQuery, PropertyId,
//! };
//! use taskview_model::models::{PriorityRegistry, StatusRegistry, TaskRecord};
//!
//! let mut query = FilterQuery::default();
//! query.root.conjunction = Conjunction::And;
//! query.root.children.push(
//!     FilterCondition::new(PropertyId::Tags, FilterOperator::Contains, "work").into(),
//! );
//!
//! let statuses = StatusRegistry::default();
//! let priorities = PriorityRegistry::default();
//! let context = FilterContext::new(&statuses, &priorities, &[]);
//! let evaluator = FilterEvaluator::new(&query, &context);
//!
//! let mut task = TaskRecord::new("Tasks/standup.md", "Standup");
//! task.tags = vec!["work/meetings".to_string()];
//! assert!(evaluator.matches(&task));
//! ```

mod error;
mod evaluator;
mod group;
mod property;
mod query;
mod search;
mod sort;

pub use error::{FilterError, FilterResult};
pub use evaluator::{parse_relative_date, FilterContext, FilterEvaluator};
pub use group::{group_tasks, TaskGroup, ALL_GROUP_KEY, NONE_GROUP_KEY};
pub use property::{
    available_properties, operators_for_kind, property_definition, value_kind_for_field,
    FilterOperator, FilterOptions, PropertyDefinition, PropertyId, SelectOption, ValueKind,
    USER_PROPERTY_PREFIX,
};
pub use query::{
    generate_node_id, Conjunction, FilterCondition, FilterGroup, FilterNode, FilterQuery,
    FilterValue, GroupKey, SortDirection, SortKey, CONDITION_ID_PREFIX, GROUP_ID_PREFIX,
    ROOT_GROUP_ID, SEARCH_ID_PREFIX,
};
pub use search::{search_term, set_search_term, strip_search};
pub use sort::{compare_tasks, sort_tasks};
