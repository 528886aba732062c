//! Date arithmetic and the random draws that decide when commits happen.
//!
//! Nothing here touches the filesystem; every function takes the random
//! source explicitly so a seeded generator reproduces a run exactly.

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Second-precision timestamp without an offset; interpreted by git in the
/// local timezone of the process.
pub type Timestamp = NaiveDateTime;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Two of three outcomes mean "this day has commits".
const ACTIVE_DAY_CHOICES: [bool; 3] = [true, false, true];

/// How the commits drawn for a single day are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOrdering {
    /// Emit in draw order. Log order and author-date order can disagree
    /// within a day.
    #[default]
    AsDrawn,
    /// Sort each day's times before emitting.
    Chronological,
}

pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// First day of the ranged generation. Saturates at the earliest
/// representable date.
pub fn start_date(today: NaiveDate, days_ago: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days_ago)))
        .unwrap_or(NaiveDate::MIN)
}

/// Noon on the day before `today`.
pub fn bootstrap_timestamp(today: NaiveDate) -> Timestamp {
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    yesterday.and_time(NaiveTime::MIN) + Duration::hours(12)
}

/// Every calendar date in `[start, today]`, oldest first. Empty when
/// `start` is after `today`.
pub fn days(start: NaiveDate, today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= today)
}

/// Whether a day gets any commits at all.
pub fn is_active_day<R: Rng + ?Sized>(rng: &mut R) -> bool {
    ACTIVE_DAY_CHOICES.choose(rng).copied().unwrap_or(false)
}

/// A uniformly random second within `day`.
pub fn random_time_on<R: Rng + ?Sized>(rng: &mut R, day: NaiveDate) -> Timestamp {
    let hours = rng.random_range(0..=23i64);
    let minutes = rng.random_range(0..=59i64);
    let seconds = rng.random_range(0..=59i64);
    day.and_time(NaiveTime::MIN)
        + Duration::hours(hours)
        + Duration::minutes(minutes)
        + Duration::seconds(seconds)
}

/// Draw the commit times for one day.
///
/// Returns an empty list for an inactive day, otherwise between 1 and
/// `max_per_day` timestamps (inclusive). A `max_per_day` of zero is treated
/// as one.
pub fn plan_day<R: Rng + ?Sized>(
    rng: &mut R,
    day: NaiveDate,
    max_per_day: u32,
    ordering: DayOrdering,
) -> Vec<Timestamp> {
    if !is_active_day(rng) {
        return Vec::new();
    }
    let count = rng.random_range(1..=max_per_day.max(1));
    let mut times: Vec<Timestamp> = (0..count).map(|_| random_time_on(rng, day)).collect();
    if ordering == DayOrdering::Chronological {
        times.sort();
    }
    times
}
