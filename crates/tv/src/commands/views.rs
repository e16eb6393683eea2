//! Saved view command implementations.

use taskview_core::filter::{FilterQuery, GroupKey};

use super::query::build_query;
use super::workspace::Workspace;
use super::{CommandContext, Result};
use crate::cli::{FilterArgs, SortField};
use crate::output::{format_view_details, format_views_json, format_views_table};

/// Options for saving a view.
#[derive(Debug, Default)]
pub struct ViewSaveOptions {
    pub name: String,
    pub filter: FilterArgs,
    pub sort: Option<SortField>,
    pub group: Option<String>,
}

/// Lists saved views in creation order.
pub fn execute_list(ctx: &CommandContext, workspace: &Workspace) -> Result<()> {
    let views = workspace.snapshot().saved_views.as_slice();
    if ctx.json_output {
        println!("{}", format_views_json(views, None)?);
    } else if !ctx.quiet {
        print!("{}", format_views_table(views, None, ctx.use_colors));
    }
    Ok(())
}

/// Shows one view's sort, grouping and condition tree.
///
/// # Errors
///
/// Returns an error if no view has that name or id.
pub fn execute_show(ctx: &CommandContext, workspace: &Workspace, name: &str) -> Result<()> {
    let view = workspace.snapshot().saved_views.find_by_name(name)?;
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else if !ctx.quiet {
        print!("{}", format_view_details(view, ctx.use_colors));
    }
    Ok(())
}

/// Builds the query a new view stores.
pub fn view_query(workspace: &Workspace, opts: &ViewSaveOptions) -> Result<FilterQuery> {
    let snapshot = workspace.snapshot();
    let mut query = build_query(&opts.filter, &snapshot.saved_views, &snapshot.user_fields)?;
    if let Some(sort) = opts.sort {
        query.sort_key = sort.into();
    }
    if let Some(group) = &opts.group {
        query.group_key = GroupKey::from(group.as_str());
    }
    Ok(query)
}

/// Saves the filter as a new view and writes the task file.
///
/// A name that is already taken is kept; lookups then resolve to the newest.
pub async fn execute_save(
    ctx: &CommandContext,
    workspace: &mut Workspace,
    opts: &ViewSaveOptions,
) -> Result<()> {
    let query = view_query(workspace, opts)?;
    if workspace.snapshot().saved_views.find_by_name(&opts.name).is_ok() {
        tracing::warn!(name = %opts.name, "a view with this name already exists");
    }

    let view = workspace
        .snapshot_mut()
        .saved_views
        .save(opts.name.clone(), query)
        .clone();
    workspace.save().await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if !ctx.quiet {
        println!("Saved view: {} ({})", view.name, view.id);
    }
    Ok(())
}

/// Deletes a view by name or id and writes the task file.
pub async fn execute_delete(ctx: &CommandContext, workspace: &mut Workspace, name: &str) -> Result<()> {
    let id = workspace.snapshot().saved_views.find_by_name(name)?.id.clone();
    let removed = workspace.snapshot_mut().saved_views.delete(&id);
    workspace.save().await?;

    if let Some(view) = removed {
        if ctx.json_output {
            println!("{}", serde_json::json!({ "deleted": view.id, "name": view.name }));
        } else if !ctx.quiet {
            println!("Deleted view: {}", view.name);
        }
    }
    Ok(())
}
