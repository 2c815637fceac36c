//! Per-project option storage.
//!
//! The host owns per-project configuration. The dispatcher only reads it
//! through the [`OptionStore`] trait, which exposes typed getters keyed by
//! project and option name. Two implementations ship with the crate:
//!
//! - [`MemoryOptionStore`] - in-process map, used by tests and embedders
//! - [`FileOptionStore`] - the same map persisted as JSON, used by the CLI
//!
//! # File Format
//!
//! ```json
//! {
//!   "myapp": { "userkey": "u...", "apikey": "a...", "severity": "40", "priority": true }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::event::Project;

/// A stored option value.
///
/// Hosts store options loosely (the severity threshold, for example, is
/// usually kept as a string), so the typed getters coerce between variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Free-form text.
    String(String),
}

impl OptionValue {
    /// Renders the value as text.
    pub fn as_string(&self) -> String {
        match self {
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Int(i) => i.to_string(),
            OptionValue::String(s) => s.clone(),
        }
    }

    /// Interprets the value as an integer, parsing strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Bool(_) => None,
            OptionValue::Int(i) => Some(*i),
            OptionValue::String(s) => s.trim().parse().ok(),
        }
    }

    /// Interprets the value as a flag.
    ///
    /// Non-zero integers and the strings `true`, `1`, `on` and `yes` are true.
    pub fn as_bool(&self) -> bool {
        match self {
            OptionValue::Bool(b) => *b,
            OptionValue::Int(i) => *i != 0,
            OptionValue::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "on" | "yes"
            ),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

/// Typed access to per-project options.
///
/// Only [`OptionStore::get`] and [`OptionStore::set`] must be implemented;
/// the typed getters coerce the raw value.
pub trait OptionStore {
    /// Returns the raw value of `key` for `project`, if set.
    fn get(&self, project: &Project, key: &str) -> Option<OptionValue>;

    /// Sets `key` for `project`, replacing any previous value.
    fn set(&mut self, project: &Project, key: &str, value: OptionValue);

    /// Returns `key` as text.
    fn get_string(&self, project: &Project, key: &str) -> Option<String> {
        self.get(project, key).map(|v| v.as_string())
    }

    /// Returns `key` as an integer, or `None` if unset or not numeric.
    fn get_int(&self, project: &Project, key: &str) -> Option<i64> {
        self.get(project, key).and_then(|v| v.as_int())
    }

    /// Returns `key` as a flag. Unset options are false.
    fn get_bool(&self, project: &Project, key: &str) -> bool {
        self.get(project, key).is_some_and(|v| v.as_bool())
    }
}

/// Options of every project, keyed by project slug then option name.
type ProjectOptions = HashMap<String, HashMap<String, OptionValue>>;

/// In-memory option store.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryOptionStore {
    projects: ProjectOptions,
}

impl MemoryOptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `key` for `project`.
    pub fn remove(&mut self, project: &Project, key: &str) {
        if let Some(options) = self.projects.get_mut(&project.slug) {
            options.remove(key);
        }
    }

    /// Number of projects with at least one option entry.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether no project has any options.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, project: &Project, key: &str) -> Option<OptionValue> {
        self.projects
            .get(&project.slug)
            .and_then(|options| options.get(key))
            .cloned()
    }

    fn set(&mut self, project: &Project, key: &str, value: OptionValue) {
        self.projects
            .entry(project.slug.clone())
            .or_default()
            .insert(key.to_string(), value);
    }
}

/// Option store persisted as a JSON file.
///
/// The file is read once on [`FileOptionStore::open`]; changes made with
/// [`OptionStore::set`] are only written back by [`FileOptionStore::save`].
#[derive(Debug)]
pub struct FileOptionStore {
    path: PathBuf,
    inner: MemoryOptionStore,
}

impl FileOptionStore {
    /// Opens the store at `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read options file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid options file {}", path.display()))?
        } else {
            MemoryOptionStore::default()
        };

        Ok(Self { path, inner })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes all options back to disk.
    ///
    /// Options contain credentials, so the file is made owner read/write only.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.inner)?)
            .with_context(|| format!("Failed to write options file {}", self.path.display()))?;

        #[cfg(unix)]
        fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;

        Ok(())
    }
}

impl OptionStore for FileOptionStore {
    fn get(&self, project: &Project, key: &str) -> Option<OptionValue> {
        self.inner.get(project, key)
    }

    fn set(&mut self, project: &Project, key: &str, value: OptionValue) {
        self.inner.set(project, key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project::new(1, "myapp")
    }

    #[test]
    fn test_typed_getters_coerce() {
        let mut store = MemoryOptionStore::new();
        store.set(&project(), "severity", "40".into());
        store.set(&project(), "priority", "on".into());
        store.set(&project(), "count", OptionValue::Int(3));

        assert_eq!(store.get_int(&project(), "severity"), Some(40));
        assert_eq!(store.get_string(&project(), "severity"), Some("40".to_string()));
        assert!(store.get_bool(&project(), "priority"));
        assert_eq!(store.get_string(&project(), "count"), Some("3".to_string()));
    }

    #[test]
    fn test_unset_options() {
        let store = MemoryOptionStore::new();
        assert_eq!(store.get_string(&project(), "userkey"), None);
        assert_eq!(store.get_int(&project(), "severity"), None);
        assert!(!store.get_bool(&project(), "priority"));
    }

    #[test]
    fn test_non_numeric_int_is_none() {
        let mut store = MemoryOptionStore::new();
        store.set(&project(), "severity", "error".into());
        assert_eq!(store.get_int(&project(), "severity"), None);
    }

    #[test]
    fn test_options_are_per_project() {
        let mut store = MemoryOptionStore::new();
        let other = Project::new(2, "other");
        store.set(&project(), "userkey", "u1".into());

        assert_eq!(store.get_string(&project(), "userkey"), Some("u1".to_string()));
        assert_eq!(store.get_string(&other, "userkey"), None);
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryOptionStore::new();
        store.set(&project(), "userkey", "u1".into());
        store.remove(&project(), "userkey");
        assert_eq!(store.get(&project(), "userkey"), None);
    }

    #[test]
    fn test_option_value_untagged_serde() {
        let json = r#"{"myapp": {"userkey": "u1", "severity": 30, "priority": true}}"#;
        let store: MemoryOptionStore = serde_json::from_str(json).expect("deserialize");
        assert_eq!(store.get(&project(), "userkey"), Some(OptionValue::String("u1".into())));
        assert_eq!(store.get(&project(), "severity"), Some(OptionValue::Int(30)));
        assert_eq!(store.get(&project(), "priority"), Some(OptionValue::Bool(true)));
    }

    #[test]
    fn test_bool_coercion() {
        assert!(OptionValue::Int(1).as_bool());
        assert!(!OptionValue::Int(0).as_bool());
        assert!(OptionValue::String("Yes".into()).as_bool());
        assert!(!OptionValue::String("".into()).as_bool());
        assert!(!OptionValue::String("off".into()).as_bool());
    }
}
