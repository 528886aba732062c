use std::fmt;

use crate::schedule::Timestamp;

/// What came back from one invocation of the version-control tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Human-readable command line, for logs.
    pub command: String,
    /// Exit code, or `None` when the process could not be spawned or was
    /// killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(command: impl Into<String>, stdout: impl Into<String>) -> Self {
        CommandOutcome {
            command: command.into(),
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(
        command: impl Into<String>,
        status: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        CommandOutcome {
            command: command.into(),
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// The most useful text to show for a failure: stderr, or stdout when
    /// the tool reported on stdout instead (`git commit` does).
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(0) => write!(f, "`{}` succeeded", self.command),
            Some(code) => write!(
                f,
                "`{}` exited with {}: {}",
                self.command,
                code,
                self.diagnostic()
            ),
            None => write!(f, "`{}` did not run: {}", self.command, self.diagnostic()),
        }
    }
}

/// The operations a fabricated history needs from a version-control tool.
///
/// Implementations never fail with an error: every problem is reported in
/// the returned [`CommandOutcome`] and the caller decides what to do.
pub trait Vcs {
    /// Create an empty repository.
    fn init(&mut self) -> CommandOutcome;

    /// Set a repository-local configuration value.
    fn set_config(&mut self, key: &str, value: &str) -> CommandOutcome;

    /// Stage every change in the working tree.
    fn stage_all(&mut self) -> CommandOutcome;

    /// Commit the index with both author and committer dates set to `date`.
    fn commit(&mut self, message: &str, date: &Timestamp) -> CommandOutcome;
}

impl<V: Vcs + ?Sized> Vcs for &mut V {
    fn init(&mut self) -> CommandOutcome {
        (**self).init()
    }

    fn set_config(&mut self, key: &str, value: &str) -> CommandOutcome {
        (**self).set_config(key, value)
    }

    fn stage_all(&mut self) -> CommandOutcome {
        (**self).stage_all()
    }

    fn commit(&mut self, message: &str, date: &Timestamp) -> CommandOutcome {
        (**self).commit(message, date)
    }
}
