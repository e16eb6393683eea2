//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/tv/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use tokio::process::Command;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use taskview_model::models::{PriorityConfig, StatusConfig};

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 2;

/// Agenda length when neither the flag nor the config sets one.
pub const DEFAULT_AGENDA_DAYS: u32 = 7;

/// Longest agenda window, in days.
pub const MAX_AGENDA_DAYS: u32 = 366;

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# tv - taskview CLI configuration

# Config schema version (do not modify)
version = 2

# Output preferences
[output]
# color = true              # Enable colors (respects NO_COLOR env)

# Agenda defaults
[agenda]
# days = 7
# show_overdue = true

# Task file location (default: ~/.local/share/tv/tasks.json)
[store]
# path = "/path/to/tasks.json"

# Status list overriding the one stored with the tasks
# [[statuses]]
# value = "open"
# label = "Open"
# is_completed = false

# Priority list overriding the one stored with the tasks
# [[priorities]]
# value = "high"
# label = "High"
# weight = 3
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Agenda settings.
    #[serde(default)]
    pub agenda: AgendaConfig,

    /// Task file settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Status list override.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<StatusConfig>,

    /// Priority list override.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priorities: Vec<PriorityConfig>,

    /// Version 1 kept the task file path at the top level.
    #[serde(default, skip_serializing)]
    tasks_file: Option<PathBuf>,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            output: OutputConfig::default(),
            agenda: AgendaConfig::default(),
            store: StoreConfig::default(),
            statuses: Vec::new(),
            priorities: Vec::new(),
            tasks_file: None,
        }
    }
}

impl Config {
    /// Agenda length, falling back to [`DEFAULT_AGENDA_DAYS`].
    pub fn agenda_days(&self) -> u32 {
        self.agenda.days.unwrap_or(DEFAULT_AGENDA_DAYS)
    }

    /// Whether the agenda shows an overdue section (default: true).
    pub fn show_overdue(&self) -> bool {
        self.agenda.show_overdue.unwrap_or(true)
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Agenda configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Number of days shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,

    /// Show the overdue section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_overdue: Option<bool>,
}

/// Task file configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the task file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/tv/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("tv"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("tv"))
        .ok_or_else(|| {
            CommandError::Config("Could not determine config directory".to_string())
        })
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("TV_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    parse_config(&content)
}

/// Parses config file contents and migrates them to the current version.
fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
/// Returns the config as-is if already at current version.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version < 2 {
        // v1 -> v2: top-level `tasks_file` moved to `[store] path`
        if config.store.path.is_none() {
            config.store.path = config.tasks_file.take();
        }
        tracing::debug!(from = config.version, to = 2, "migrated config");
        config.version = 2;
    }

    config.tasks_file = None;
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Saves the configuration to disk.
fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CommandError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&path, content)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if !path.exists() {
            println!("(No config file exists. Run 'tv config edit' to create one.)");
            return Ok(());
        }

        println!("[output]");
        if let Some(color) = config.output.color {
            println!("  color: {}", color);
        }

        println!("\n[agenda]");
        println!("  days: {}", config.agenda_days());
        println!("  show_overdue: {}", config.show_overdue());

        println!("\n[store]");
        if let Some(ref store) = config.store.path {
            println!("  path: {}", store.display());
        }

        if !config.statuses.is_empty() {
            let values: Vec<&str> = config.statuses.iter().map(|s| s.value.as_str()).collect();
            println!("\nstatuses: {}", values.join(", "));
        }
        if !config.priorities.is_empty() {
            let values: Vec<&str> = config.priorities.iter().map(|p| p.value.as_str()).collect();
            println!("priorities: {}", values.join(", "));
        }
    }

    Ok(())
}

/// Executes the config edit command.
pub async fn execute_edit(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CommandError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    if !path.exists() {
        fs::write(&path, DEFAULT_CONFIG)
            .map_err(|e| CommandError::Config(format!("Failed to create config file: {}", e)))?;

        if !ctx.quiet && !ctx.json_output {
            eprintln!("Created default config at: {}", path.display());
        }
    }

    let editor = env::var("EDITOR")
        .or_else(|_| env::var("VISUAL"))
        .unwrap_or_else(|_| "vi".to_string());

    tracing::debug!(path = %path.display(), editor = %editor, "opening config");

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .await
        .map_err(|e| CommandError::Config(format!("Failed to open editor '{}': {}", editor, e)))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": if status.success() { "success" } else { "error" },
            "editor": editor,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        if status.success() {
            println!("Config saved.");
        } else {
            eprintln!("Editor exited with error");
        }
    }

    Ok(())
}

/// Options for the config set command.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Applies one `key = value` setting to `config`.
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "output.color" => config.output.color = Some(parse_bool(value)?),
        "agenda.days" => {
            let days = value
                .parse::<u32>()
                .ok()
                .filter(|d| (1..=MAX_AGENDA_DAYS).contains(d))
                .ok_or_else(|| {
                    CommandError::Config(format!(
                        "Invalid agenda.days value '{}'. Use a number from 1 to 366",
                        value
                    ))
                })?;
            config.agenda.days = Some(days);
        }
        "agenda.show_overdue" => config.agenda.show_overdue = Some(parse_bool(value)?),
        "store.path" => {
            config.store.path = if value.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: output.color, agenda.days, agenda.show_overdue, store.path",
                key
            )));
        }
    }
    Ok(())
}

/// Executes the config set command.
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let mut config = load_config()?;
    let path = get_config_path()?;

    apply_setting(&mut config, &opts.key, &opts.value)?;
    save_config(&config)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Parses a boolean value from string.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "Invalid boolean value '{}'. Use true/false, yes/no, 1/0, or on/off",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Runs `f` with `TV_CONFIG` pointing into a fresh temp dir.
    fn with_config_env<T>(f: impl FnOnce(&std::path::Path) -> T) -> T {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let original = env::var("TV_CONFIG").ok();
        env::set_var("TV_CONFIG", &config_path);

        let result = f(&config_path);

        match original {
            Some(val) => env::set_var("TV_CONFIG", val),
            None => env::remove_var("TV_CONFIG"),
        }
        result
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_bool_values() {
        for value in ["true", "True", "yes", "1", "on"] {
            assert!(parse_bool(value).unwrap(), "{value}");
        }
        for value in ["false", "NO", "0", "off"] {
            assert!(!parse_bool(value).unwrap(), "{value}");
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.agenda_days(), DEFAULT_AGENDA_DAYS);
        assert!(config.show_overdue());
        assert!(config.store.path.is_none());
        assert!(config.statuses.is_empty());
    }

    #[test]
    fn test_default_config_template_parses() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.output.color.is_none());
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config = parse_config("").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.agenda_days(), 7);
    }

    #[test]
    fn test_config_deserialization_full() {
        let toml_str = r#"
version = 2

[output]
color = false

[agenda]
days = 14
show_overdue = false

[store]
path = "/data/tasks.json"

[[statuses]]
value = "todo"
label = "To do"

[[statuses]]
value = "shipped"
label = "Shipped"
is_completed = true

[[priorities]]
value = "urgent"
label = "Urgent"
weight = 9
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.output.color, Some(false));
        assert_eq!(config.agenda_days(), 14);
        assert!(!config.show_overdue());
        assert_eq!(config.store.path, Some(PathBuf::from("/data/tasks.json")));
        assert_eq!(config.statuses.len(), 2);
        assert!(config.statuses[1].is_completed);
        assert_eq!(config.priorities[0].weight, 9);
    }

    #[test]
    fn test_config_serialization_skips_unset() {
        let mut config = Config::default();
        config.agenda.days = Some(3);
        let toml_str = toml::to_string_pretty(&config).unwrap();

        assert!(toml_str.contains("version = 2"));
        assert!(toml_str.contains("days = 3"));
        assert!(!toml_str.contains("show_overdue"));
        assert!(!toml_str.contains("statuses"));
    }

    // ==================== Migration ====================

    #[test]
    fn test_migrate_v1_moves_tasks_file() {
        let config = parse_config("version = 1\ntasks_file = \"/old/tasks.json\"\n").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.store.path, Some(PathBuf::from("/old/tasks.json")));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("tasks_file"));
    }

    #[test]
    fn test_migrate_v1_keeps_explicit_store_path() {
        let config = parse_config(
            "version = 1\ntasks_file = \"/old.json\"\n[store]\npath = \"/new.json\"\n",
        )
        .unwrap();
        assert_eq!(config.store.path, Some(PathBuf::from("/new.json")));
    }

    #[test]
    fn test_config_with_future_version() {
        let config = parse_config("version = 99\n").unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
    }

    // ==================== Settings ====================

    #[test]
    fn test_apply_setting() {
        let mut config = Config::default();
        apply_setting(&mut config, "output.color", "off").unwrap();
        apply_setting(&mut config, "agenda.days", "10").unwrap();
        apply_setting(&mut config, "agenda.show_overdue", "no").unwrap();
        apply_setting(&mut config, "store.path", "/tmp/t.json").unwrap();

        assert_eq!(config.output.color, Some(false));
        assert_eq!(config.agenda_days(), 10);
        assert!(!config.show_overdue());
        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/t.json")));

        apply_setting(&mut config, "store.path", "").unwrap();
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply_setting(&mut config, "agenda.days", "0").is_err());
        assert!(apply_setting(&mut config, "agenda.days", "soon").is_err());
        assert!(apply_setting(&mut config, "output.colour", "true").is_err());
    }

    // ==================== Files ====================

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        with_config_env(|expected| {
            assert_eq!(get_config_path().unwrap(), expected);
        });
    }

    #[test]
    #[serial]
    fn test_load_missing_config_is_default() {
        with_config_env(|_| {
            let config = load_config().unwrap();
            assert_eq!(config.agenda_days(), DEFAULT_AGENDA_DAYS);
        });
    }

    #[test]
    #[serial]
    fn test_save_and_load_roundtrip() {
        with_config_env(|path| {
            let mut config = Config::default();
            config.agenda.days = Some(5);
            config.statuses = vec![StatusConfig::new("todo", "To do", "", false)];
            save_config(&config).unwrap();
            assert!(path.exists());

            let loaded = load_config().unwrap();
            assert_eq!(loaded.agenda_days(), 5);
            assert_eq!(loaded.statuses, config.statuses);
        });
    }

    #[test]
    #[serial]
    fn test_load_invalid_config_errors() {
        with_config_env(|path| {
            fs::write(path, "[agenda]\ndays = \"many\"\n").unwrap();
            assert!(matches!(load_config(), Err(CommandError::Config(_))));
        });
    }
}
