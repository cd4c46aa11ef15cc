use chrono::{FixedOffset, Offset, Utc};
use std::time::Duration;

pub const DEFAULT_MILESTONES: [u32; 4] = [3, 7, 14, 30];
pub const DEFAULT_MAX_FREEZES: u32 = 1;
pub const DEFAULT_AUTO_FREEZE: bool = true;
pub const DEFAULT_MILESTONE_XP: i64 = 50;

/// Largest UTC offset chrono accepts, in minutes (just under a day)
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Ascending, de-duplicated set of positive streak lengths that earn a reward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneThresholds(Vec<u32>);

impl MilestoneThresholds {
    /// Keep the positive values, sorted and de-duplicated.
    /// Falls back to the defaults when nothing usable remains.
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        let mut values: Vec<u32> = values.into_iter().filter(|v| *v > 0).collect();
        values.sort_unstable();
        values.dedup();

        if values.is_empty() {
            Self::default()
        } else {
            Self(values)
        }
    }

    /// Parse a comma or whitespace separated list such as `"3, 7,14 30"`.
    /// Entries that are not positive integers are dropped.
    pub fn parse_lenient(raw: &str) -> Self {
        let values = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.parse::<i64>().ok())
            .filter(|v| *v > 0 && *v <= u32::MAX as i64)
            .map(|v| v as u32);

        Self::new(values)
    }

    pub fn contains(&self, streak: u32) -> bool {
        self.0.binary_search(&streak).is_ok()
    }

    /// Smallest threshold strictly greater than `streak`
    pub fn next_after(&self, streak: u32) -> Option<u32> {
        self.0.iter().copied().find(|t| *t > streak)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl Default for MilestoneThresholds {
    fn default() -> Self {
        Self(DEFAULT_MILESTONES.to_vec())
    }
}

/// Bounded retry for optimistic transaction conflicts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one, at least 1
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
        }
    }

    /// Exponential backoff before retry number `retry` (1-based), capped at `max_backoff`
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(500),
        }
    }
}

/// Streak tunables, built once at startup and passed to the services
#[derive(Debug, Clone)]
pub struct StreakConfig {
    pub milestone_thresholds: MilestoneThresholds,
    pub max_freezes: u32,
    /// Used when the user has no stored preference
    pub auto_freeze_default: bool,
    pub milestone_xp_bonus: i64,
    /// Offset whose midnight separates calendar days
    pub day_boundary_offset: FixedOffset,
    pub retry: RetryPolicy,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            milestone_thresholds: MilestoneThresholds::default(),
            max_freezes: DEFAULT_MAX_FREEZES,
            auto_freeze_default: DEFAULT_AUTO_FREEZE,
            milestone_xp_bonus: DEFAULT_MILESTONE_XP,
            day_boundary_offset: Utc.fix(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Build an offset from minutes east of UTC, `None` when out of range
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(minutes * 60)
}

/// Lenient boolean parsing, `None` for anything unrecognised
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
