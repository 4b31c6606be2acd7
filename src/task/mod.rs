//! Edit task definitions.
//!
//! A task file holds an ordered list of tasks; each task is one of
//! `add`, `remove`, `copy` or `delete`. Tasks with any other `type` are
//! loaded as [`Task::Unknown`] and skipped when applied.

mod source;

pub use source::TaskList;

use serde::Deserialize;

use crate::dataset::GeoSite;

/// Country code that selects every record in `add` and `remove` tasks.
pub const WILDCARD: &str = "*";

/// A single declarative edit instruction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTask")]
pub enum Task {
    /// Append root-domain rules to the selected records.
    Add {
        country_code: String,
        domains: Vec<String>,
    },
    /// Remove rules with matching values from the selected records.
    Remove {
        country_code: String,
        domains: Vec<String>,
    },
    /// Copy missing rules from one record into another.
    Copy {
        src_country_code: String,
        dst_country_code: String,
    },
    /// Delete whole records.
    Delete { entries: Vec<String> },
    /// A task type this crate does not know.
    Unknown(String),
}

impl Task {
    pub fn add(country_code: impl Into<String>, domains: &[&str]) -> Self {
        Task::Add {
            country_code: country_code.into(),
            domains: to_strings(domains),
        }
    }

    pub fn remove(country_code: impl Into<String>, domains: &[&str]) -> Self {
        Task::Remove {
            country_code: country_code.into(),
            domains: to_strings(domains),
        }
    }

    pub fn copy(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Task::Copy {
            src_country_code: src.into(),
            dst_country_code: dst.into(),
        }
    }

    pub fn delete(entries: &[&str]) -> Self {
        Task::Delete {
            entries: to_strings(entries),
        }
    }

    /// The task's `type` string.
    pub fn kind(&self) -> &str {
        match self {
            Task::Add { .. } => "add",
            Task::Remove { .. } => "remove",
            Task::Copy { .. } => "copy",
            Task::Delete { .. } => "delete",
            Task::Unknown(kind) => kind,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Which records an `add` or `remove` task applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountrySelector<'a> {
    /// Every record
    All,
    /// Records whose key matches, ignoring case
    Code(&'a str),
}

impl<'a> CountrySelector<'a> {
    pub fn parse(country_code: &'a str) -> Self {
        if country_code == WILDCARD {
            CountrySelector::All
        } else {
            CountrySelector::Code(country_code)
        }
    }

    pub fn selects(&self, site: &GeoSite) -> bool {
        match self {
            CountrySelector::All => true,
            CountrySelector::Code(code) => site.is_keyed(code),
        }
    }
}

/// Flat wire shape of a task; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct RawTask {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    domains: Option<Vec<String>>,
    #[serde(default)]
    entries: Option<Vec<String>>,
    #[serde(default)]
    src_country_code: Option<String>,
    #[serde(default)]
    dst_country_code: Option<String>,
}

impl From<RawTask> for Task {
    fn from(raw: RawTask) -> Self {
        match raw.kind.as_str() {
            "add" => Task::Add {
                country_code: raw.country_code.unwrap_or_default(),
                domains: raw.domains.unwrap_or_default(),
            },
            "remove" => Task::Remove {
                country_code: raw.country_code.unwrap_or_default(),
                domains: raw.domains.unwrap_or_default(),
            },
            "copy" => Task::Copy {
                src_country_code: raw.src_country_code.unwrap_or_default(),
                dst_country_code: raw.dst_country_code.unwrap_or_default(),
            },
            "delete" => Task::Delete {
                entries: raw.entries.unwrap_or_default(),
            },
            _ => Task::Unknown(raw.kind),
        }
    }
}
