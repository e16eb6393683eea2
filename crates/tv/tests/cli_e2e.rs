//! CLI-focused end-to-end tests driving the `tv` binary.
//!
//! Each test writes a task file into a temp directory, points the binary at
//! it with `--store` and an absent config file, and checks the JSON output.
//! They are scenario-driven: few tests, multi-step flows.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

struct CliContext {
    _dir: TempDir,
    store: PathBuf,
    config: PathBuf,
}

impl CliContext {
    fn new(snapshot: Value) -> Self {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("tasks.json");
        std::fs::write(&store, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
        let config = dir.path().join("config.toml");
        Self {
            _dir: dir,
            store,
            config,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tv"))
            .arg("--json")
            .arg("--store")
            .arg(&self.store)
            .args(args)
            .env("TV_CONFIG", &self.config)
            .env_remove("TV_STORE")
            .env_remove("TV_LOG")
            .output()
            .unwrap()
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "tv {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn stored(&self) -> Value {
        read_json(&self.store)
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn fixture() -> Value {
    json!({
        "tasks": [
            {
                "path": "Tasks/report.md",
                "title": "Write report",
                "priority": "high",
                "due": "2025-03-11",
                "tags": ["work"]
            },
            {
                "path": "Tasks/groceries.md",
                "title": "Buy groceries",
                "priority": "low",
                "due": "2025-03-12",
                "tags": ["home"]
            },
            {
                "path": "Tasks/standup.md",
                "title": "Standup",
                "scheduled": "2025-03-10",
                "recurrence": "FREQ=WEEKLY;BYDAY=MO,WE,FR",
                "tags": ["work"]
            },
            {
                "path": "Tasks/late.md",
                "title": "Renew passport",
                "due": "2025-03-01"
            }
        ]
    })
}

fn titles(group: &Value) -> Vec<String> {
    group["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_cli_list_filter_save_view_and_reuse() {
    let ctx = CliContext::new(fixture());

    let listed = ctx.run_json(&["list", "-w", "tags:contains:work", "--sort", "title"]);
    assert_eq!(listed["total"], 2);
    assert_eq!(titles(&listed["groups"][0]), vec!["Standup", "Write report"]);

    let saved = ctx.run_json(&["views", "save", "Work", "-w", "tags:contains:work"]);
    assert_eq!(saved["name"], "Work");
    assert_eq!(ctx.stored()["saved_views"].as_array().unwrap().len(), 1);

    // The same conditions now resolve to the saved view
    let listed = ctx.run_json(&["list", "--view", "work"]);
    assert_eq!(listed["view"], "Work");
    assert_eq!(listed["total"], 2);

    // Extra conditions narrow the view
    let narrowed = ctx.run_json(&["list", "--view", "work", "-w", "priority:is:high"]);
    assert_eq!(narrowed["total"], 1);
    assert!(narrowed["view"].is_null());

    let deleted = ctx.run_json(&["views", "delete", "Work"]);
    assert_eq!(deleted["name"], "Work");
    assert!(ctx.stored()["saved_views"].as_array().unwrap().is_empty());
}

#[test]
fn test_cli_agenda_and_instance_toggles() {
    let ctx = CliContext::new(fixture());

    let agenda = ctx.run_json(&["agenda", "--from", "2025-03-10", "--days", "3"]);
    let overdue: Vec<&str> = agenda["overdue"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(overdue, vec!["Renew passport"]);
    assert_eq!(agenda["days"].as_array().unwrap().len(), 3);
    assert_eq!(titles(&agenda["days"][0]), vec!["Standup"]);
    assert_eq!(titles(&agenda["days"][1]), vec!["Write report"]);

    let done = ctx.run_json(&["done", "standup", "--date", "2025-03-10"]);
    assert_eq!(done["status"], "completed");
    assert_eq!(done["next"], "2025-03-12");
    assert_eq!(ctx.stored()["tasks"][2]["complete_instances"], json!(["2025-03-10"]));

    let skipped = ctx.run_json(&["skip", "standup", "--date", "2025-03-12"]);
    assert_eq!(skipped["status"], "skipped");

    let status = ctx.run_json(&["status", "Tasks/standup.md", "--date", "2025-03-12"]);
    assert_eq!(status["status"], "skipped");

    // A hidden overdue section drops the key
    let agenda = ctx.run_json(&["agenda", "--from", "2025-03-10", "--days", "1", "--no-overdue"]);
    assert!(agenda.get("overdue").is_none());
}

#[test]
fn test_cli_errors_are_reported_as_json() {
    let ctx = CliContext::new(fixture());

    let output = ctx.run(&["skip", "Write report"]);
    assert_eq!(output.status.code(), Some(1));
    let error: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["error"]["code"], "NOT_RECURRING");

    let output = ctx.run(&["list", "-w", "colour:is:red"]);
    assert_eq!(output.status.code(), Some(1));
    let error: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["error"]["code"], "FILTER_ERROR");

    let output = ctx.run(&["status", "nothing like this"]);
    let error: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["error"]["code"], "NOT_FOUND");
}
