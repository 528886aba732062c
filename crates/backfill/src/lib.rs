#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod files;
pub mod generator;
pub mod schedule;
pub mod vcs;

pub use config::{Identity, Settings};
pub use error::{BackfillError, ConfigError, Result};
pub use files::{DEFAULT_FILES, FileSpec, seed_files};
pub use generator::{CommitRecord, FailurePolicy, Generator, RunReport, initialize_repository};
pub use schedule::{DayOrdering, Timestamp};
pub use vcs::{CommandOutcome, Vcs};
