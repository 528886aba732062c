use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{Identity, Settings};
use crate::error::{BackfillError, ConfigError, Result};
use crate::files::{AppendedMarker, FileSpec, append_marker};
use crate::schedule::{self, Timestamp, format_timestamp};
use crate::vcs::{CommandOutcome, Vcs};

/// What to do when staging or committing fails after a marker was appended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log and move on. The appended marker stays in the file and is picked
    /// up by the next successful commit.
    #[default]
    Continue,
    /// Log, truncate the marker back out of the file, stage the file again
    /// if the marker had been staged, and move on.
    Rollback,
    /// Stop the run with [`BackfillError::CommitFailed`]. The marker stays.
    Abort,
}

/// One attempted commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub timestamp: Timestamp,
    pub file: &'static str,
    pub committed: bool,
}

/// Counters for a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Calendar days walked by the ranged generation.
    pub days_visited: u64,
    /// Days on which at least one commit was drawn.
    pub active_days: u64,
    /// Commit attempts, bootstrap included.
    pub attempted: u64,
    pub committed: u64,
    pub failed: u64,
    /// Failed attempts whose marker was removed again.
    pub rolled_back: u64,
}

/// Create `dir` if needed, then initialize a repository there and set the
/// local identity.
///
/// Tool failures are logged and returned; only a failure to create the
/// directory is an error.
pub fn initialize_repository<V: Vcs>(
    dir: &Path,
    vcs: &mut V,
    identity: &Identity,
) -> io::Result<Vec<CommandOutcome>> {
    fs::create_dir_all(dir)?;

    let outcomes = vec![
        vcs.init(),
        vcs.set_config("user.name", &identity.name),
        vcs.set_config("user.email", &identity.email),
    ];
    for outcome in outcomes.iter().filter(|o| !o.is_success()) {
        warn!(
            command = %outcome.command,
            stderr = %outcome.diagnostic(),
            "error running command"
        );
    }
    Ok(outcomes)
}

type Observer<'a> = Box<dyn FnMut(&CommitRecord) + 'a>;

/// Drives marker appends and commits against a [`Vcs`].
pub struct Generator<'a, V, R> {
    dir: &'a Path,
    files: &'a [FileSpec],
    vcs: V,
    rng: R,
    settings: &'a Settings,
    observer: Option<Observer<'a>>,
    report: RunReport,
}

impl<'a, V: Vcs, R: Rng> Generator<'a, V, R> {
    pub fn new(
        dir: &'a Path,
        files: &'a [FileSpec],
        vcs: V,
        rng: R,
        settings: &'a Settings,
    ) -> Self {
        Generator {
            dir,
            files,
            vcs,
            rng,
            settings,
            observer: None,
            report: RunReport::default(),
        }
    }

    /// Call `observer` for every attempted commit, in emission order.
    pub fn with_observer(mut self, observer: impl FnMut(&CommitRecord) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Bootstrap commit, then the ranged generation ending at `today`.
    pub fn run(&mut self, today: NaiveDate) -> Result<RunReport> {
        self.settings.validate_range(today)?;
        self.bootstrap(today)?;
        self.generate_range(today)?;
        Ok(self.report.clone())
    }

    /// The unconditional commit dated noon of the day before `today`.
    pub fn bootstrap(&mut self, today: NaiveDate) -> Result<CommitRecord> {
        let ts = schedule::bootstrap_timestamp(today);
        debug!(timestamp = %format_timestamp(&ts), "bootstrap commit");
        self.commit_at(ts)
    }

    /// Walk every day from `start_days_ago` before `today` through `today`.
    pub fn generate_range(&mut self, today: NaiveDate) -> Result<()> {
        let start = schedule::start_date(today, self.settings.start_days_ago);
        info!(%start, %today, "generating commits");

        for day in schedule::days(start, today) {
            self.report.days_visited += 1;
            let times = schedule::plan_day(
                &mut self.rng,
                day,
                self.settings.max_commits_per_day,
                self.settings.ordering,
            );
            if times.is_empty() {
                continue;
            }
            self.report.active_days += 1;
            debug!(%day, commits = times.len(), "active day");
            for ts in times {
                self.commit_at(ts)?;
            }
        }
        Ok(())
    }

    /// Append a marker for `ts` to a random file, stage, and commit.
    pub fn commit_at(&mut self, ts: Timestamp) -> Result<CommitRecord> {
        let spec = *self
            .files
            .choose(&mut self.rng)
            .ok_or_else(|| {
                BackfillError::Config(ConfigError::Invalid {
                    field: "files",
                    reason: "no files to modify".to_string(),
                })
            })?;
        let stamp = format_timestamp(&ts);
        self.report.attempted += 1;

        let marker = append_marker(self.dir, &spec, &stamp).map_err(|source| {
            BackfillError::Marker {
                path: self.dir.join(spec.name),
                source,
            }
        })?;

        let staged = self.vcs.stage_all();
        let staged_ok = staged.is_success();
        let outcome = if staged_ok {
            self.vcs.commit(&format!("Dummy commit on {}", stamp), &ts)
        } else {
            staged
        };

        let committed = outcome.is_success();
        if committed {
            self.report.committed += 1;
        } else {
            self.handle_failure(outcome, marker, staged_ok)?;
        }

        let record = CommitRecord {
            timestamp: ts,
            file: spec.name,
            committed,
        };
        if let Some(observer) = self.observer.as_mut() {
            observer(&record);
        }
        Ok(record)
    }

    /// `restage` is set when the marker already made it into the index, so a
    /// rollback has to stage the reverted file again.
    fn handle_failure(
        &mut self,
        outcome: CommandOutcome,
        marker: AppendedMarker,
        restage: bool,
    ) -> Result<()> {
        warn!(
            command = %outcome.command,
            stderr = %outcome.diagnostic(),
            "error running command"
        );
        self.report.failed += 1;

        match self.settings.failure_policy {
            FailurePolicy::Continue => Ok(()),
            FailurePolicy::Rollback => {
                let path = marker.path().to_path_buf();
                marker
                    .revert()
                    .map_err(|source| BackfillError::Marker { path, source })?;
                if restage {
                    let restaged = self.vcs.stage_all();
                    if !restaged.is_success() {
                        warn!(
                            command = %restaged.command,
                            stderr = %restaged.diagnostic(),
                            "error restaging rolled back file"
                        );
                    }
                }
                self.report.rolled_back += 1;
                Ok(())
            }
            FailurePolicy::Abort => {
                let stderr = outcome.diagnostic().to_string();
                Err(BackfillError::CommitFailed {
                    command: outcome.command,
                    stderr,
                })
            }
        }
    }
}
