//! Output formatting utilities for the tv CLI.
//!
//! This module provides functions for formatting data as tables or JSON.
//! It is organized into submodules by what is being printed:
//!
//! - [`tasks`] - Task lists, groups and single-instance states
//! - [`agenda`] - Agenda days with the overdue section
//! - [`views`] - Saved views and query trees
//! - [`options`] - Filterable properties and their known values
//! - [`helpers`] - Common formatting utilities (truncation, priority, dates)

mod agenda;
pub mod helpers;
mod options;
mod tasks;
mod views;

pub use agenda::{format_agenda_json, format_agenda_text};
pub use options::{format_options_json, format_options_text};
pub use tasks::{
    format_groups_json, format_groups_table, format_instance, format_instance_json,
    InstanceOutput, TaskStyle,
};
pub use views::{format_query_tree, format_view_details, format_views_json, format_views_table};
