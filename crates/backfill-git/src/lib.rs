#![doc = include_str!("../README.md")]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use backfill::schedule::format_timestamp;
use backfill::{CommandOutcome, Timestamp, Vcs};
use chrono::{DateTime, NaiveDateTime};
use git2::{ErrorCode, Repository};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// Command-line backend
// ============================================================================

/// [`Vcs`] backed by the system `git` binary, run inside one repository
/// directory.
///
/// Every call blocks until git exits. Arguments are passed straight to the
/// process, never through a shell.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
    program: OsString,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        GitCli {
            repo_dir: repo_dir.into(),
            program: OsString::from("git"),
        }
    }

    /// Use a different git executable.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    fn run(&self, args: &[&str], env: &[(&str, &str)]) -> CommandOutcome {
        let shown = display_command(&self.program, args);

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(&self.repo_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (k, v) in env {
            cmd.env(k, v);
        }

        debug!(command = %shown, "spawning git");

        match cmd.output() {
            Ok(output) => CommandOutcome {
                command: shown,
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => CommandOutcome::failure(shown, None, e.to_string()),
        }
    }
}

impl Vcs for GitCli {
    fn init(&mut self) -> CommandOutcome {
        self.run(&["init"], &[])
    }

    fn set_config(&mut self, key: &str, value: &str) -> CommandOutcome {
        self.run(&["config", key, value], &[])
    }

    fn stage_all(&mut self) -> CommandOutcome {
        self.run(&["add", "."], &[])
    }

    fn commit(&mut self, message: &str, date: &Timestamp) -> CommandOutcome {
        let date = format_timestamp(date);
        self.run(
            &["commit", "-m", message, "--date", &date],
            &[("GIT_AUTHOR_DATE", &date), ("GIT_COMMITTER_DATE", &date)],
        )
    }
}

/// Render a command line for logs, quoting arguments that contain spaces.
fn display_command(program: &OsString, args: &[&str]) -> String {
    let mut out = program.to_string_lossy().into_owned();
    for arg in args {
        out.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
            out.push('"');
            out.push_str(&arg.replace('"', "\\\""));
            out.push('"');
        } else {
            out.push_str(arg);
        }
    }
    out
}

// ============================================================================
// History summary
// ============================================================================

/// Read-only overview of a repository's history reachable from HEAD.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub commits: usize,
    /// Oldest author date, as stamped (in the author's own offset).
    pub earliest: Option<NaiveDateTime>,
    /// Newest author date, as stamped.
    pub latest: Option<NaiveDateTime>,
    /// Commits whose author date is older than their first parent's.
    pub out_of_order: usize,
}

/// Walk HEAD's history and summarize author dates.
///
/// A repository with no commits yet yields an empty summary.
pub fn summarize(repo_dir: &Path) -> Result<HistorySummary> {
    let repo = Repository::open(repo_dir)
        .with_context(|| format!("Failed to open repository at {:?}", repo_dir))?;

    match repo.head() {
        Ok(_) => {}
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            return Ok(HistorySummary::default());
        }
        Err(e) => return Err(e).context("Failed to resolve HEAD"),
    }

    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;

    let mut summary = HistorySummary::default();
    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;
        summary.commits += 1;

        let when = commit.author().when();
        if let Some(stamped) = stamped_time(when) {
            summary.earliest = Some(summary.earliest.map_or(stamped, |e| e.min(stamped)));
            summary.latest = Some(summary.latest.map_or(stamped, |l| l.max(stamped)));
        }

        if commit.parent_count() > 0 {
            let parent = commit.parent(0)?;
            if when.seconds() < parent.author().when().seconds() {
                summary.out_of_order += 1;
            }
        }
    }
    Ok(summary)
}

/// The wall-clock time a git timestamp was recorded with.
fn stamped_time(time: git2::Time) -> Option<NaiveDateTime> {
    let local = time.seconds() + i64::from(time.offset_minutes()) * 60;
    DateTime::from_timestamp(local, 0).map(|dt| dt.naive_utc())
}

// ============================================================================
// Tests
// ============================================================================
