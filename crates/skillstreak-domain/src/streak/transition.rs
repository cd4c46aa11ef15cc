use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::StreakRecord;
use super::config::{MilestoneThresholds, StreakConfig};
use super::value_objects::StreakKey;

/// How an activity moved the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// First activity for the key, record created
    Started,
    /// Another activity on the same calendar day
    SameDay,
    /// Activity on the next calendar day
    Continued,
    /// One missed day bridged by consuming a freeze
    FreezeBridged,
    /// Gap too large (or no freeze available), streak back to 1
    Reset,
    /// Activity dated before the stored calendar day, nothing changes
    Stale,
}

impl TransitionKind {
    /// Whether the streak counter went up through a continuation
    pub fn is_increment(&self) -> bool {
        matches!(self, TransitionKind::Continued | TransitionKind::FreezeBridged)
    }

    /// Whether the record must be written back
    pub fn requires_write(&self) -> bool {
        !matches!(self, TransitionKind::Stale)
    }
}

/// Inputs of a single transition that come from configuration or user preference
#[derive(Debug, Clone)]
pub struct TransitionPolicy {
    pub milestone_thresholds: MilestoneThresholds,
    /// Freeze budget for records created by this transition
    pub max_freezes: u32,
    pub auto_freeze_enabled: bool,
    pub day_boundary_offset: FixedOffset,
}

impl TransitionPolicy {
    pub fn from_config(config: &StreakConfig, auto_freeze_enabled: bool) -> Self {
        Self {
            milestone_thresholds: config.milestone_thresholds.clone(),
            max_freezes: config.max_freezes,
            auto_freeze_enabled,
            day_boundary_offset: config.day_boundary_offset,
        }
    }
}

/// Result of applying one activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub record: StreakRecord,
    pub kind: TransitionKind,
    /// Threshold reached by this transition, if any
    pub milestone: Option<u32>,
}

/// Calendar days between two instants, both truncated to midnight in `offset`
pub fn diff_days(from: DateTime<Utc>, to: DateTime<Utc>, offset: &FixedOffset) -> i64 {
    (local_date(to, offset) - local_date(from, offset)).num_days()
}

fn local_date(at: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    at.with_timezone(offset).date_naive()
}

/// Compute the next state of a streak for an activity at `activity_at`.
///
/// Pure: the caller is responsible for reading `existing` and writing the
/// returned record inside one transaction.
pub fn apply_activity(
    key: &StreakKey,
    existing: Option<&StreakRecord>,
    activity_at: DateTime<Utc>,
    policy: &TransitionPolicy,
) -> Transition {
    let Some(existing) = existing else {
        let mut record = StreakRecord::start(key.clone(), activity_at, policy.max_freezes);
        record.bump_version();
        return Transition {
            record,
            kind: TransitionKind::Started,
            milestone: None,
        };
    };

    let mut record = existing.clone();
    let days = diff_days(
        existing.last_activity(),
        activity_at,
        &policy.day_boundary_offset,
    );

    let kind = match days {
        d if d < 0 => TransitionKind::Stale,
        0 => {
            record.touch(activity_at);
            TransitionKind::SameDay
        }
        1 => {
            record.extend(activity_at);
            TransitionKind::Continued
        }
        2 if policy.auto_freeze_enabled && record.freezes_used() < record.max_freezes() => {
            record.consume_freeze(activity_at);
            record.extend(activity_at);
            TransitionKind::FreezeBridged
        }
        _ => {
            record.reset(activity_at);
            TransitionKind::Reset
        }
    };

    if kind.requires_write() {
        record.bump_version();
    }

    let milestone = (kind.is_increment()
        && record.current_streak() > 1
        && policy
            .milestone_thresholds
            .contains(record.current_streak()))
    .then_some(record.current_streak());

    Transition {
        record,
        kind,
        milestone,
    }
}
