//! Saved view output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use taskview_core::filter::{FilterGroup, FilterNode, FilterQuery, FilterValue};
use taskview_core::SavedView;

/// JSON output structure for a saved view.
#[derive(Serialize)]
pub struct ViewOutput<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub conditions: usize,
    pub active: bool,
}

/// Number of conditions in a group, counting nested groups.
fn count_conditions(group: &FilterGroup) -> usize {
    group
        .children
        .iter()
        .map(|node| match node {
            FilterNode::Condition(_) => 1,
            FilterNode::Group(g) => count_conditions(g),
        })
        .sum()
}

/// Formats saved views as JSON.
pub fn format_views_json(views: &[SavedView], active_id: Option<&str>) -> Result<String, serde_json::Error> {
    let output: Vec<ViewOutput> = views
        .iter()
        .map(|v| ViewOutput {
            id: &v.id,
            name: &v.name,
            conditions: count_conditions(&v.query.root),
            active: active_id == Some(v.id.as_str()),
        })
        .collect();
    serde_json::to_string_pretty(&output)
}

/// Formats saved views as a table.
pub fn format_views_table(views: &[SavedView], active_id: Option<&str>, use_colors: bool) -> String {
    if views.is_empty() {
        return "No saved views.\n".to_string();
    }

    let mut output = String::new();
    for view in views {
        let marker = if active_id == Some(view.id.as_str()) { "*" } else { " " };
        let name = if use_colors {
            view.name.bold().to_string()
        } else {
            view.name.clone()
        };
        output.push_str(&format!(
            "{marker} {:<24} {:<28} {} conditions\n",
            name,
            view.id,
            count_conditions(&view.query.root)
        ));
    }
    output
}

fn format_value(value: &FilterValue) -> String {
    match value {
        FilterValue::None => String::new(),
        FilterValue::List(items) => items.join(","),
        other => other.as_text().unwrap_or_default(),
    }
}

fn push_tree(output: &mut String, group: &FilterGroup, depth: usize) {
    let indent = "  ".repeat(depth);
    let conjunction = match group.conjunction {
        taskview_core::filter::Conjunction::And => "all of",
        taskview_core::filter::Conjunction::Or => "any of",
    };
    output.push_str(&format!("{indent}{conjunction}:\n"));
    for node in &group.children {
        match node {
            FilterNode::Condition(c) => {
                let property = c.property.as_ref().map(|p| p.to_string()).unwrap_or_default();
                let value = format_value(&c.value);
                let line = if value.is_empty() {
                    format!("{property} {}", c.operator)
                } else {
                    format!("{property} {} {value}", c.operator)
                };
                output.push_str(&format!("{indent}  {}\n", line.trim_end()));
            }
            FilterNode::Group(g) => push_tree(output, g, depth + 1),
        }
    }
}

/// Formats a query as an indented condition tree.
pub fn format_query_tree(query: &FilterQuery) -> String {
    if query.root.children.is_empty() {
        return "(matches every task)\n".to_string();
    }
    let mut output = String::new();
    push_tree(&mut output, &query.root, 0);
    output
}

/// Formats one saved view for display.
pub fn format_view_details(view: &SavedView, use_colors: bool) -> String {
    let title = if use_colors {
        view.name.green().bold().to_string()
    } else {
        view.name.clone()
    };
    let mut output = format!("{title}\nID: {}\n", view.id);
    output.push_str(&format!("Sort: {:?} {:?}\n", view.query.sort_key, view.query.sort_direction));
    output.push_str(&format!("Group: {}\n\n", view.query.group_key));
    output.push_str(&format_query_tree(&view.query));
    output
}
