//! Filter option output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;
use taskview_core::filter::{FilterOptions, PropertyDefinition, ValueKind};

/// JSON output for one filterable property.
#[derive(Serialize)]
pub struct PropertyOutput<'a> {
    pub id: String,
    pub label: &'a str,
    pub kind: &'static str,
    pub operators: Vec<&'a str>,
}

/// JSON output structure for the options command.
#[derive(Serialize)]
pub struct OptionsOutput<'a> {
    pub properties: Vec<PropertyOutput<'a>>,
    #[serde(flatten)]
    pub values: &'a FilterOptions,
}

fn kind_name(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Text => "text",
        ValueKind::Select => "select",
        ValueKind::MultiSelect => "list",
        ValueKind::Date => "date",
        ValueKind::Number => "number",
        ValueKind::Boolean => "boolean",
    }
}

fn property_output(definition: &PropertyDefinition) -> PropertyOutput<'_> {
    PropertyOutput {
        id: definition.id.to_string(),
        label: &definition.label,
        kind: kind_name(definition.kind),
        operators: definition.operators.iter().map(|op| op.as_str()).collect(),
    }
}

/// Formats properties and option values as JSON.
pub fn format_options_json(
    properties: &[PropertyDefinition],
    values: &FilterOptions,
) -> Result<String, serde_json::Error> {
    let output = OptionsOutput {
        properties: properties.iter().map(property_output).collect(),
        values,
    };
    serde_json::to_string_pretty(&output)
}

fn section(output: &mut String, title: &str, use_colors: bool) {
    if use_colors {
        output.push_str(&format!("{}\n", title.bold()));
    } else {
        output.push_str(&format!("{title}\n"));
    }
}

fn value_line(output: &mut String, name: &str, values: &[String]) {
    let shown = if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    };
    output.push_str(&format!("  {:<12} {}\n", name, shown));
}

/// Formats properties and option values for display.
pub fn format_options_text(
    properties: &[PropertyDefinition],
    values: &FilterOptions,
    use_colors: bool,
) -> String {
    let mut output = String::new();
    section(&mut output, "Properties", use_colors);
    for definition in properties {
        let operators: Vec<&str> = definition.operators.iter().map(|op| op.as_str()).collect();
        output.push_str(&format!(
            "  {:<20} {:<8} {}\n",
            definition.id.to_string(),
            kind_name(definition.kind),
            operators.join(", ")
        ));
    }

    output.push('\n');
    section(&mut output, "Values", use_colors);
    let statuses: Vec<String> = values.statuses.iter().map(|s| s.value.clone()).collect();
    let priorities: Vec<String> = values.priorities.iter().map(|p| p.value.clone()).collect();
    value_line(&mut output, "status", &statuses);
    value_line(&mut output, "priority", &priorities);
    value_line(&mut output, "tags", &values.tags);
    value_line(&mut output, "contexts", &values.contexts);
    value_line(&mut output, "projects", &values.projects);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskview_core::filter::available_properties;
    use taskview_model::models::{
        PriorityRegistry, StatusRegistry, TaskRecord, UserFieldDefinition, UserFieldKind,
    };

    fn fixtures() -> (Vec<PropertyDefinition>, FilterOptions) {
        let fields = vec![UserFieldDefinition {
            id: "effort".to_string(),
            display_name: "Effort".to_string(),
            key: "effort".to_string(),
            kind: UserFieldKind::Number,
        }];
        let mut task = TaskRecord::new("Tasks/a.md", "A");
        task.tags = vec!["work".to_string(), "home".to_string()];
        let options = FilterOptions::collect(
            &[task],
            &StatusRegistry::default(),
            &PriorityRegistry::default(),
        );
        (available_properties(&fields), options)
    }

    #[test]
    fn test_format_options_text() {
        let (properties, values) = fixtures();
        let text = format_options_text(&properties, &values, false);
        assert!(text.contains("user:effort"));
        assert!(text.contains("  tags         home, work\n"));
        assert!(text.contains("  contexts     (none)\n"));
        assert!(text.contains("status       none, open, in-progress, done"));
    }

    #[test]
    fn test_format_options_json() {
        let (properties, values) = fixtures();
        let json: serde_json::Value =
            serde_json::from_str(&format_options_json(&properties, &values).unwrap()).unwrap();
        assert_eq!(json["properties"][0]["id"], "title");
        assert_eq!(json["properties"][0]["kind"], "text");
        assert_eq!(json["tags"][0], "home");
        let last = json["properties"].as_array().unwrap().last().unwrap().clone();
        assert_eq!(last["id"], "user:effort");
        assert_eq!(last["kind"], "number");
    }
}
