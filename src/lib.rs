//! geopatch - declarative edits for geosite domain-list datasets.
//!
//! This crate loads a geosite dataset (the `geosite.dat` protobuf used by
//! V2Ray-family routers), applies an ordered list of edit tasks to it and
//! writes the result back out.
//!
//! # Features
//!
//! - **add / remove**: Add or remove domains in one country record, or in
//!   every record with the `*` wildcard
//! - **copy**: Merge one record's rules into another, creating it if needed
//! - **delete**: Drop whole records
//! - **Idempotent**: Tasks that match nothing are no-ops, so task files can be
//!   re-run safely
//! - **Lossless codec**: Fields this crate does not model survive a
//!   decode/encode cycle
//! - **Remote sources**: Source datasets can be fetched over http(s), plain or
//!   gzip-compressed
//!
//! # Quick Start
//!
//! ```ignore
//! use geopatch::{run, RunOptions, TaskList};
//! use std::path::Path;
//!
//! let tasks = TaskList::from_path(Path::new("tasks.json"))?;
//! let summary = run(&tasks, &RunOptions::default())?;
//! for line in summary.report.lines() {
//!     println!("{}", line);
//! }
//! ```
//!
//! # Task File
//!
//! ```text
//! {
//!   "src": "./geosite.dat",
//!   "dst": "./geosite-custom.dat",
//!   "tasks": [
//!     {"type": "add", "country_code": "cn", "domains": ["example.cn"]},
//!     {"type": "remove", "country_code": "*", "domains": ["tracker.example"]},
//!     {"type": "copy", "src_country_code": "google", "dst_country_code": "proxy"},
//!     {"type": "delete", "entries": ["category-ads-all"]}
//!   ]
//! }
//! ```
//!
//! Country codes are compared case-insensitively; domain values are compared
//! exactly.

mod domain_type;
mod error;
mod runner;

pub mod codec;
pub mod dataset;
pub mod engine;
pub mod task;

// Re-export core types
pub use domain_type::DomainType;
pub use error::{Error, Result};

// Re-export the task model and engine
pub use engine::{apply_tasks, ApplyReport, Change, Editor};
pub use task::{CountrySelector, Task, TaskList};

// Re-export the codec
pub use codec::{DatasetReader, DatasetWriter};

// Re-export run pipeline
pub use runner::{is_remote, load_dataset, run, RunOptions, RunSummary};
