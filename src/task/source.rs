//! Task file loading.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::Task;
use crate::Result;

/// Contents of a task file: where to read the dataset, where to write it,
/// and the tasks to apply in between.
///
/// # Example
///
/// ```
/// use geopatch::TaskList;
///
/// let list = TaskList::from_json(r#"{
///     "src": "geosite.dat",
///     "dst": "geosite-custom.dat",
///     "tasks": [{"type": "delete", "entries": ["category-ads"]}]
/// }"#).unwrap();
/// assert_eq!(list.tasks.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskList {
    /// Source dataset: a local path or an http(s) URL
    #[serde(default)]
    pub src: String,
    /// Destination path
    #[serde(default)]
    pub dst: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskList {
    /// Parse a JSON task file.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a YAML task file.
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a task file, choosing YAML for `.yml`/`.yaml` and JSON otherwise.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"))
            .unwrap_or(false);

        let list = if is_yaml {
            Self::from_yaml(&content)?
        } else {
            Self::from_json(&content)?
        };

        log::debug!("Loaded {} tasks from {:?}", list.tasks.len(), path);
        Ok(list)
    }
}
