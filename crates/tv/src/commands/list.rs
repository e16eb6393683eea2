//! List command implementation.
//!
//! Lists tasks from the task file, filtered, sorted and optionally grouped.

use taskview_core::filter::{
    group_tasks, FilterContext, FilterEvaluator, FilterQuery, GroupKey, SortDirection,
};
use taskview_model::models::TaskRecord;

use super::query::build_query;
use super::workspace::Workspace;
use super::{CommandContext, Result};
use crate::cli::{FilterArgs, SortField};
use crate::output::{format_groups_json, format_groups_table, TaskStyle};

/// Options for the list command.
#[derive(Debug, Default)]
pub struct ListOptions {
    /// View, conditions and search term.
    pub filter: FilterArgs,
    /// Sort field.
    pub sort: Option<SortField>,
    /// Reverse sort order.
    pub reverse: bool,
    /// Grouping key.
    pub group: Option<String>,
    /// Subgrouping key.
    pub subgroup: Option<String>,
    /// Limit results.
    pub limit: usize,
    /// Show all tasks (no limit).
    pub all: bool,
}

/// Builds the list query: the filter plus any sort and grouping overrides.
pub fn list_query(workspace: &Workspace, opts: &ListOptions) -> Result<FilterQuery> {
    let snapshot = workspace.snapshot();
    let mut query = build_query(&opts.filter, &snapshot.saved_views, &snapshot.user_fields)?;

    if let Some(sort) = opts.sort {
        query.sort_key = sort.into();
    }
    if opts.reverse {
        query.sort_direction = match query.sort_direction {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        };
    }
    if let Some(group) = &opts.group {
        query.group_key = GroupKey::from(group.as_str());
    }
    if let Some(subgroup) = &opts.subgroup {
        query.subgroup_key = Some(GroupKey::from(subgroup.as_str()));
    }
    Ok(query)
}

/// Applies the limit to sorted tasks.
fn apply_limit<'a>(tasks: Vec<&'a TaskRecord>, opts: &ListOptions) -> Vec<&'a TaskRecord> {
    if opts.all {
        tasks
    } else {
        tasks.into_iter().take(opts.limit).collect()
    }
}

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if a condition is invalid or the named view does not exist.
pub fn execute(ctx: &CommandContext, workspace: &Workspace, opts: &ListOptions) -> Result<()> {
    let snapshot = workspace.snapshot();
    let query = list_query(workspace, opts)?;
    if !query.is_empty() && !query.is_meaningful_with(&snapshot.user_fields) {
        tracing::debug!("query has no complete condition, every task matches");
    }

    let statuses = workspace.status_registry();
    let priorities = workspace.priority_registry();
    let context = FilterContext::new(&statuses, &priorities, &snapshot.user_fields).with_today(ctx.today);
    let evaluator = FilterEvaluator::new(&query, &context);

    let sorted = evaluator.filter_and_sort(&snapshot.tasks);
    let total = sorted.len();
    let shown = apply_limit(sorted, opts);
    let truncated = shown.len() < total;
    let groups = group_tasks(&shown, &query.group_key, query.subgroup_key.as_ref(), &context);

    let view = snapshot.saved_views.active(&query).map(|v| v.name.as_str());

    if ctx.json_output {
        let output = format_groups_json(&groups, view, total, truncated)?;
        println!("{output}");
    } else if !ctx.quiet {
        let style = TaskStyle {
            statuses: &statuses,
            priorities: &priorities,
            today: ctx.today,
            use_colors: ctx.use_colors,
        };
        if let Some(name) = view {
            println!("View: {name}\n");
        }
        print!("{}", format_groups_table(&groups, &style));
        if truncated {
            println!("\n({} of {} tasks shown, use --all to see every task)", shown.len(), total);
        }
    }

    Ok(())
}
