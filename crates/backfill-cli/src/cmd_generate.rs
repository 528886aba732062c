use anyhow::{Context, Result};
use backfill::config::{
    DEFAULT_MAX_COMMITS_PER_DAY, DEFAULT_PROJECT_NAME, DEFAULT_START_DAYS_AGO,
};
use backfill::{
    DEFAULT_FILES, DayOrdering, FailurePolicy, Generator, Identity, RunReport, Settings,
    initialize_repository, seed_files,
};
use backfill_git::{GitCli, HistorySummary, summarize};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ============================================================================
// CLI argument types
// ============================================================================

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Parent directory for the project (default: current directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Project directory name
    #[arg(long, default_value = DEFAULT_PROJECT_NAME)]
    pub project: String,

    /// How many days before today the history starts
    #[arg(long, default_value_t = DEFAULT_START_DAYS_AGO)]
    pub days: u32,

    /// Maximum commits on a single day
    #[arg(long, default_value_t = DEFAULT_MAX_COMMITS_PER_DAY)]
    pub max_per_day: u32,

    /// Seed for the random generator; a run with the same seed, range, and
    /// files produces the same history
    #[arg(long)]
    pub seed: Option<u64>,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Emit each day's commits in time order instead of draw order
    #[arg(long)]
    pub chronological: bool,

    /// What to do when staging or committing fails
    #[arg(long, value_enum, default_value_t = OnFailure::Continue)]
    pub on_failure: OnFailure,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnFailure {
    /// Log and keep going; the file change stays
    Continue,
    /// Log, undo the file change, and keep going
    Rollback,
    /// Stop with a non-zero exit status
    Abort,
}

impl From<OnFailure> for FailurePolicy {
    fn from(value: OnFailure) -> Self {
        match value {
            OnFailure::Continue => FailurePolicy::Continue,
            OnFailure::Rollback => FailurePolicy::Rollback,
            OnFailure::Abort => FailurePolicy::Abort,
        }
    }
}

impl GenerateArgs {
    fn settings(&self) -> Settings {
        Settings {
            project_name: self.project.clone(),
            start_days_ago: self.days,
            max_commits_per_day: self.max_per_day,
            ordering: if self.chronological {
                DayOrdering::Chronological
            } else {
                DayOrdering::AsDrawn
            },
            failure_policy: self.on_failure.into(),
        }
    }
}

#[derive(Serialize, Debug)]
struct Output<'a> {
    path: &'a Path,
    seed: u64,
    today: NaiveDate,
    report: &'a RunReport,
    history: Option<&'a HistorySummary>,
}

// ============================================================================
// Run
// ============================================================================

pub fn run(args: GenerateArgs) -> Result<()> {
    // Variables already in the environment win over the .env file.
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("could not read .env: {}", e),
    }

    // Nothing below may touch the disk until these pass.
    let identity = Identity::from_env()?;
    let settings = args.settings();
    settings.validate()?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    settings.validate_range(today)?;

    let parent = match &args.dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => std::env::current_dir()?.join(dir),
        None => std::env::current_dir()?,
    };
    let repo_path = parent.join(&settings.project_name);

    let mut git = GitCli::new(&repo_path);
    initialize_repository(&repo_path, &mut git, &identity)
        .with_context(|| format!("Failed to create project directory {:?}", repo_path))?;
    seed_files(&repo_path, &DEFAULT_FILES)
        .with_context(|| format!("Failed to write starter files in {:?}", repo_path))?;

    let seed = args.seed.unwrap_or_else(time_seed);
    info!(seed, %today, path = %repo_path.display(), "starting generation");

    let report = Generator::new(
        &repo_path,
        &DEFAULT_FILES,
        git,
        StdRng::seed_from_u64(seed),
        &settings,
    )
    .run(today)?;

    let history = match summarize(&repo_path) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!("could not summarize history: {:#}", e);
            None
        }
    };

    if args.json {
        let out = Output {
            path: &repo_path,
            seed,
            today,
            report: &report,
            history: history.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_report(&report, history.as_ref(), seed);
    println!("Dummy project created at {}", repo_path.display());
    println!("You can now navigate to the project directory and push it to GitHub.");
    Ok(())
}

fn print_report(report: &RunReport, history: Option<&HistorySummary>, seed: u64) {
    println!(
        "{} commits over {} of {} days ({} failed, {} rolled back), seed {}",
        report.committed,
        report.active_days,
        report.days_visited,
        report.failed,
        report.rolled_back,
        seed
    );
    if let Some(h) = history {
        if let (Some(first), Some(last)) = (h.earliest, h.latest) {
            println!(
                "History: {} commits from {} to {}",
                h.commits,
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            );
        }
    }
}

/// Seed derived from the wall clock, for runs without `--seed`.
fn time_seed() -> u64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp())
        .unsigned_abs()
}
