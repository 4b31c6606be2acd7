//! Change records produced while applying tasks.

use std::fmt;

/// One effected change, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A rule was appended to a record
    Added { domain: String, country: String },
    /// An `add` found the value already present
    AlreadyExists { domain: String, country: String },
    /// A rule was removed from a record
    Removed { domain: String, country: String },
    /// A rule was copied between records
    Copied {
        domain: String,
        from: String,
        to: String,
    },
    /// A whole record was deleted
    Deleted { country: String },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Added { domain, country } => write!(f, "added {} to {}", domain, country),
            Change::AlreadyExists { domain, country } => {
                write!(f, "{} already exists in {}", domain, country)
            }
            Change::Removed { domain, country } => {
                write!(f, "removed {} from {}", domain, country)
            }
            Change::Copied { domain, from, to } => {
                write!(f, "copied {} from {} to {}", domain, from, to)
            }
            Change::Deleted { country } => write!(f, "deleting entry for {}", country),
        }
    }
}

/// Outcome of applying a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    changes: Vec<Change>,
    /// Tasks of a known type that were applied
    pub tasks_applied: usize,
    /// Tasks of an unknown type that were skipped
    pub tasks_ignored: usize,
}

impl ApplyReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a change and append it to the report.
    pub(crate) fn record(&mut self, change: Change) {
        log::info!("{}", change);
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Human-readable log lines, one per change.
    pub fn lines(&self) -> Vec<String> {
        self.changes.iter().map(ToString::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn added(&self) -> usize {
        self.count(|c| matches!(c, Change::Added { .. }))
    }

    pub fn already_existing(&self) -> usize {
        self.count(|c| matches!(c, Change::AlreadyExists { .. }))
    }

    pub fn removed(&self) -> usize {
        self.count(|c| matches!(c, Change::Removed { .. }))
    }

    pub fn copied(&self) -> usize {
        self.count(|c| matches!(c, Change::Copied { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.count(|c| matches!(c, Change::Deleted { .. }))
    }

    fn count(&self, pred: impl Fn(&Change) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(*c)).count()
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tasks applied ({} ignored): {} added, {} already present, {} removed, {} copied, {} entries deleted",
            self.tasks_applied,
            self.tasks_ignored,
            self.added(),
            self.already_existing(),
            self.removed(),
            self.copied(),
            self.deleted()
        )
    }
}
