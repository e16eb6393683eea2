//! Options command implementation.
//!
//! Prints every property a condition can target, with its operators, and the
//! values currently in use across the task file.

use taskview_core::filter::{available_properties, FilterOptions};

use super::workspace::Workspace;
use super::{CommandContext, Result};
use crate::output::{format_options_json, format_options_text};

/// Executes the options command.
pub fn execute(ctx: &CommandContext, workspace: &Workspace) -> Result<()> {
    let snapshot = workspace.snapshot();
    let properties = available_properties(&snapshot.user_fields);
    let values = FilterOptions::collect(
        &snapshot.tasks,
        &workspace.status_registry(),
        &workspace.priority_registry(),
    );

    if ctx.json_output {
        println!("{}", format_options_json(&properties, &values)?);
    } else if !ctx.quiet {
        print!("{}", format_options_text(&properties, &values, ctx.use_colors));
    }
    Ok(())
}
