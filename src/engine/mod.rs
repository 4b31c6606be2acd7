//! Task application engine.
//!
//! [`Editor`] applies tasks to a dataset in place, strictly in order. Tasks
//! that match nothing degrade to no-ops, so a task file can be re-run over a
//! partially edited dataset without failing. Every effected change is logged
//! as it happens and collected in an [`ApplyReport`].

mod change;

pub use change::{ApplyReport, Change};

use ahash::AHashSet;

use crate::dataset::{Domain, GeoSite, GeoSiteList};
use crate::task::{CountrySelector, Task};

/// Applies tasks to a borrowed dataset.
///
/// # Examples
/// ```
/// use geopatch::dataset::{Domain, GeoSite, GeoSiteList};
/// use geopatch::{Editor, Task};
///
/// let mut list = GeoSiteList::from_entries(vec![GeoSite::new("CN")]);
/// let mut editor = Editor::new(&mut list);
/// editor.apply(&Task::add("cn", &["example.cn"]));
/// let report = editor.finish();
///
/// assert_eq!(report.lines(), ["added example.cn to CN"]);
/// assert_eq!(list.entries[0].domains, vec![Domain::root("example.cn")]);
/// ```
pub struct Editor<'a> {
    dataset: &'a mut GeoSiteList,
    report: ApplyReport,
}

impl<'a> Editor<'a> {
    pub fn new(dataset: &'a mut GeoSiteList) -> Self {
        Self {
            dataset,
            report: ApplyReport::new(),
        }
    }

    /// Apply a single task.
    pub fn apply(&mut self, task: &Task) {
        log::debug!("Applying {} task", task.kind());
        match task {
            Task::Add {
                country_code,
                domains,
            } => self.add(country_code, domains),
            Task::Remove {
                country_code,
                domains,
            } => self.remove(country_code, domains),
            Task::Copy {
                src_country_code,
                dst_country_code,
            } => self.copy(src_country_code, dst_country_code),
            Task::Delete { entries } => self.delete(entries),
            Task::Unknown(kind) => {
                log::debug!("Skipping task with unknown type {:?}", kind);
                self.report.tasks_ignored += 1;
                return;
            }
        }
        self.report.tasks_applied += 1;
    }

    /// Apply tasks in order.
    pub fn apply_all<'t>(&mut self, tasks: impl IntoIterator<Item = &'t Task>) {
        for task in tasks {
            self.apply(task);
        }
    }

    /// The dataset as edited so far.
    pub fn dataset(&self) -> &GeoSiteList {
        self.dataset
    }

    pub fn report(&self) -> &ApplyReport {
        &self.report
    }

    /// Release the dataset and return the report.
    pub fn finish(self) -> ApplyReport {
        self.report
    }

    fn add(&mut self, country_code: &str, domains: &[String]) {
        let selector = CountrySelector::parse(country_code);
        let report = &mut self.report;

        for site in self.dataset.entries.iter_mut().filter(|s| selector.selects(s)) {
            for domain in domains {
                if site.contains_value(domain) {
                    report.record(Change::AlreadyExists {
                        domain: domain.clone(),
                        country: site.country_code.clone(),
                    });
                } else {
                    site.domains.push(Domain::root(domain.as_str()));
                    report.record(Change::Added {
                        domain: domain.clone(),
                        country: site.country_code.clone(),
                    });
                }
            }
        }
    }

    fn remove(&mut self, country_code: &str, domains: &[String]) {
        let selector = CountrySelector::parse(country_code);
        let report = &mut self.report;

        for site in self.dataset.entries.iter_mut().filter(|s| selector.selects(s)) {
            let GeoSite {
                country_code,
                domains: rules,
                ..
            } = site;

            for domain in domains {
                rules.retain(|rule| {
                    if rule.value != *domain {
                        return true;
                    }
                    report.record(Change::Removed {
                        domain: domain.clone(),
                        country: country_code.clone(),
                    });
                    false
                });
            }
        }
    }

    fn copy(&mut self, src: &str, dst: &str) {
        let src_index = self.dataset.find_index(src);
        let dst_index = match self.dataset.find_index(dst) {
            Some(index) => index,
            None => {
                log::debug!("Creating entry for {}", dst);
                self.dataset.entries.push(GeoSite::new(dst));
                self.dataset.entries.len() - 1
            }
        };

        let Some(src_index) = src_index else {
            log::debug!("No entry for {}, nothing to copy", src);
            return;
        };
        // A record already holds all of its own values.
        if src_index == dst_index {
            return;
        }

        let (source, destination) =
            source_and_destination(&mut self.dataset.entries, src_index, dst_index);
        let mut present: AHashSet<String> = destination.values().map(str::to_owned).collect();

        for rule in &source.domains {
            if present.insert(rule.value.clone()) {
                destination.domains.push(rule.clone());
                self.report.record(Change::Copied {
                    domain: rule.value.clone(),
                    from: src.to_string(),
                    to: dst.to_string(),
                });
            }
        }
    }

    fn delete(&mut self, entries: &[String]) {
        let report = &mut self.report;

        self.dataset.entries.retain(|site| {
            if !entries.iter().any(|code| site.is_keyed(code)) {
                return true;
            }
            report.record(Change::Deleted {
                country: site.country_code.clone(),
            });
            false
        });
    }
}

/// Borrow two distinct records, one shared and one mutable.
fn source_and_destination(
    entries: &mut [GeoSite],
    src: usize,
    dst: usize,
) -> (&GeoSite, &mut GeoSite) {
    debug_assert_ne!(src, dst);
    if src < dst {
        let (head, tail) = entries.split_at_mut(dst);
        (&head[src], &mut tail[0])
    } else {
        let (head, tail) = entries.split_at_mut(src);
        (&tail[0], &mut head[dst])
    }
}

/// Apply `tasks` to `dataset` in order and return the report.
pub fn apply_tasks(dataset: &mut GeoSiteList, tasks: &[Task]) -> ApplyReport {
    let mut editor = Editor::new(dataset);
    editor.apply_all(tasks);
    editor.finish()
}
