//! Command definitions and execution.
//!
//! Commands:
//! - `get <path>` - Print the value at a path
//! - `set <path> <value> [--json]` - Store a value and write the file
//! - `remove <path>` - Remove a value and write the file
//! - `keys [path] [--deep]` - List keys of the root or of a section
//! - `dump [--format yaml|json]` - Print the whole document
//! - `check` - Report how the file loaded

use clap::{Subcommand, ValueEnum};

use dotconf_core::{Codec, Format, Value};
use dotconf_serde::{json_to_value, yaml_to_value, MultiCodec};
use dotconf_store::{ConfigStore, LoadOutcome};

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the value at a dotted path
    Get { path: String },

    /// Store a value at a dotted path
    Set {
        path: String,
        /// Parsed as a YAML scalar unless --json is given
        value: String,
        /// Parse the value as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the value at a dotted path
    Remove { path: String },

    /// List keys of the document, or of the section at a path
    Keys {
        path: Option<String>,
        /// Include nested keys as dotted paths
        #[arg(long)]
        deep: bool,
    },

    /// Print the whole document
    Dump {
        #[arg(long, value_enum, default_value_t = DumpFormat::Yaml)]
        format: DumpFormat,
    },

    /// Load the file and report the outcome
    Check,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    Yaml,
    Json,
}

impl DumpFormat {
    fn format(self) -> Format {
        match self {
            DumpFormat::Yaml => Format::YAML,
            DumpFormat::Json => Format::JSON,
        }
    }
}

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command succeeded, optionally with output to display
    Ok { display: Option<String> },
    /// Command failed with an error message
    Error(String),
}

impl CommandResult {
    fn ok_display(display: impl Into<String>) -> Self {
        CommandResult::Ok {
            display: Some(display.into()),
        }
    }

    fn ok_none() -> Self {
        CommandResult::Ok { display: None }
    }
}

/// Load the store and execute `command` against it.
pub fn run(store: &ConfigStore, command: &Commands) -> CommandResult {
    let outcome = store.load();
    if let LoadOutcome::Quarantined { broken } = &outcome {
        log::warn!("continuing with an empty document, the file was moved to {}", broken.display());
    }

    match command {
        Commands::Check => check(store, &outcome),
        Commands::Get { path } => get(store, path),
        Commands::Set { path, value, json } => set(store, path, value, *json),
        Commands::Remove { path } => remove(store, path),
        Commands::Keys { path, deep } => {
            let keys = match path {
                Some(path) => store.keys_at(path.as_str(), *deep),
                None => store.get_keys(*deep),
            };
            if keys.is_empty() {
                CommandResult::ok_none()
            } else {
                CommandResult::ok_display(keys.join("\n"))
            }
        }
        Commands::Dump { format } => dump(store, *format),
    }
}

fn check(store: &ConfigStore, outcome: &LoadOutcome) -> CommandResult {
    let file = store.file().display();
    match outcome {
        LoadOutcome::Loaded => CommandResult::ok_display(format!(
            "{}: ok ({} keys)",
            file,
            store.get_keys(true).len()
        )),
        LoadOutcome::Missing => CommandResult::ok_display(format!("{}: missing", file)),
        LoadOutcome::Skipped => CommandResult::ok_display(format!("{}: skipped", file)),
        LoadOutcome::ReadFailed => CommandResult::Error(format!("{}: could not be read", file)),
        LoadOutcome::Quarantined { broken } => CommandResult::Error(format!(
            "{}: broken, moved to {}",
            file,
            broken.display()
        )),
    }
}

fn get(store: &ConfigStore, path: &str) -> CommandResult {
    match store.get(path) {
        None => CommandResult::Error(format!("{} does not exist", path)),
        Some(Value::Null) => CommandResult::ok_display("null"),
        Some(value) => match value.to_text() {
            Some(text) => CommandResult::ok_display(text),
            None => render(&value, Format::YAML),
        },
    }
}

fn set(store: &ConfigStore, path: &str, raw: &str, json: bool) -> CommandResult {
    let value = match parse_value(raw, json) {
        Ok(value) => value,
        Err(message) => return CommandResult::Error(message),
    };

    if let Err(e) = store.set(path, value) {
        return CommandResult::Error(e.to_string());
    }
    persist(store)
}

fn remove(store: &ConfigStore, path: &str) -> CommandResult {
    if store.remove(path).is_none() {
        return CommandResult::Error(format!("{} does not exist", path));
    }
    persist(store)
}

fn persist(store: &ConfigStore) -> CommandResult {
    match store.force_save() {
        Ok(()) => CommandResult::ok_none(),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

fn dump(store: &ConfigStore, format: DumpFormat) -> CommandResult {
    let format = format.format();
    if &format == store.format() {
        return match store.save_to_string() {
            Ok(text) => CommandResult::ok_display(text.trim_end()),
            Err(e) => CommandResult::Error(e.to_string()),
        };
    }
    store.read_locked(|doc| render(doc, format))
}

fn render(value: &Value, format: Format) -> CommandResult {
    match MultiCodec::with_defaults().encode(value, &format) {
        Ok(text) => CommandResult::ok_display(text.trim_end()),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Parse a command-line value.
///
/// Without `json`, the text is read as a YAML scalar so `8`, `true` and `1.5`
/// keep their types. Anything YAML cannot parse is stored as a plain string.
fn parse_value(raw: &str, json: bool) -> Result<Value, String> {
    if json {
        let parsed: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))?;
        return Ok(json_to_value(parsed));
    }

    match serde_yaml::from_str::<serde_yaml::Value>(raw).map(yaml_to_value) {
        Ok(Ok(value)) => Ok(value),
        _ => Ok(Value::from(raw)),
    }
}
