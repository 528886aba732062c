use chrono::NaiveDate;

use crate::error::ConfigError;
use crate::generator::FailurePolicy;
use crate::schedule::{self, DayOrdering};

/// Environment variable holding the author/committer name.
pub const NAME_VAR: &str = "GITHUB_NAME";
/// Environment variable holding the author/committer email.
pub const EMAIL_VAR: &str = "GITHUB_EMAIL";

pub const DEFAULT_PROJECT_NAME: &str = "JavaScript-Project";
/// Roughly three years.
pub const DEFAULT_START_DAYS_AGO: u32 = 1095;
pub const DEFAULT_MAX_COMMITS_PER_DAY: u32 = 10;

/// First date a fabricated commit may carry. Git rejects author dates
/// before the Unix epoch.
pub fn earliest_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Identity written into the repository's local config and used for every
/// fabricated commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    /// Read [`NAME_VAR`] and [`EMAIL_VAR`] from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build an identity from an arbitrary key lookup.
    ///
    /// Unset and blank values are both treated as missing; the first missing
    /// variable is the one reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = required(&lookup, NAME_VAR)?;
        let email = required(&lookup, EMAIL_VAR)?;
        Ok(Identity { name, email })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(key)),
    }
}

/// Knobs for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory name created under the parent directory.
    pub project_name: String,
    /// How many days before today the ranged generation starts.
    pub start_days_ago: u32,
    /// Upper bound (inclusive) on commits drawn for an active day.
    pub max_commits_per_day: u32,
    pub ordering: DayOrdering,
    pub failure_policy: FailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            start_days_ago: DEFAULT_START_DAYS_AGO,
            max_commits_per_day: DEFAULT_MAX_COMMITS_PER_DAY,
            ordering: DayOrdering::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.project_name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "project_name",
                reason: "must not be empty".to_string(),
            });
        }
        if name != self.project_name {
            return Err(ConfigError::Invalid {
                field: "project_name",
                reason: format!(
                    "'{}' has leading or trailing whitespace",
                    self.project_name
                ),
            });
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ConfigError::Invalid {
                field: "project_name",
                reason: format!("'{}' is not a plain directory name", self.project_name),
            });
        }
        if self.max_commits_per_day == 0 {
            return Err(ConfigError::Invalid {
                field: "max_commits_per_day",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Check that the ranged generation ending at `today` starts no earlier
    /// than [`earliest_start`].
    pub fn validate_range(&self, today: NaiveDate) -> Result<(), ConfigError> {
        let start = schedule::start_date(today, self.start_days_ago);
        let earliest = earliest_start();
        if start < earliest {
            return Err(ConfigError::Invalid {
                field: "start_days_ago",
                reason: format!(
                    "{} days before {} is {}, earlier than {}",
                    self.start_days_ago, today, start, earliest
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_identity_from_lookup() {
        let id = Identity::from_lookup(lookup(&[
            (NAME_VAR, "Ada Lovelace"),
            (EMAIL_VAR, "ada@example.com"),
        ]))
        .unwrap();
        assert_eq!(id.name, "Ada Lovelace");
        assert_eq!(id.email, "ada@example.com");
    }

    #[test]
    fn test_identity_missing_name() {
        let err = Identity::from_lookup(lookup(&[(EMAIL_VAR, "ada@example.com")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(NAME_VAR));
    }

    #[test]
    fn test_identity_missing_email() {
        let err = Identity::from_lookup(lookup(&[(NAME_VAR, "Ada")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(EMAIL_VAR));
    }

    #[test]
    fn test_identity_blank_value_is_missing() {
        let err = Identity::from_lookup(lookup(&[(NAME_VAR, "   "), (EMAIL_VAR, "a@b.c")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(NAME_VAR));
    }

    #[test]
    fn test_missing_var_message_names_variable() {
        let msg = ConfigError::MissingVar(EMAIL_VAR).to_string();
        assert!(msg.contains("GITHUB_EMAIL"));
    }

    #[test]
    fn test_settings_defaults() {
        let s = Settings::default();
        assert_eq!(s.project_name, "JavaScript-Project");
        assert_eq!(s.start_days_ago, 1095);
        assert_eq!(s.max_commits_per_day, 10);
        assert_eq!(s.ordering, DayOrdering::AsDrawn);
        assert_eq!(s.failure_policy, FailurePolicy::Continue);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_settings_rejects_zero_max() {
        let s = Settings {
            max_commits_per_day: 0,
            ..Default::default()
        };
        assert!(matches!(
            s.validate(),
            Err(ConfigError::Invalid {
                field: "max_commits_per_day",
                ..
            })
        ));
    }

    #[test]
    fn test_settings_rejects_bad_project_names() {
        for name in ["", "  ", "a/b", "..", ".", " demo", "demo\t"] {
            let s = Settings {
                project_name: name.to_string(),
                ..Default::default()
            };
            assert!(s.validate().is_err(), "accepted {name:?}");
        }
    }

    #[test]
    fn test_range_from_epoch_is_accepted() {
        let today = NaiveDate::from_ymd_opt(1970, 1, 11).unwrap();
        let s = Settings {
            start_days_ago: 10,
            ..Default::default()
        };
        assert!(s.validate_range(today).is_ok());
    }

    #[test]
    fn test_range_before_epoch_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let s = Settings {
            start_days_ago: 20_000,
            ..Default::default()
        };
        assert!(matches!(
            s.validate_range(today),
            Err(ConfigError::Invalid {
                field: "start_days_ago",
                ..
            })
        ));
        assert!(Settings::default().validate_range(today).is_ok());
    }
}
