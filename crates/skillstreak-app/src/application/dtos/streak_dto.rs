use serde::{Deserialize, Serialize};

use skillstreak_domain::streak::{MilestoneThresholds, StreakRecord, StreakType};

/// Read model of one streak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakDto {
    pub user_id: String,
    pub streak_type: StreakType,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity: String, // RFC 3339
    pub freezes_used: u32,
    pub max_freezes: u32,
    pub freezes_remaining: u32,
    pub last_freeze_at: Option<String>,
    /// Next threshold above the current streak, `None` once past the last one
    pub next_milestone: Option<u32>,
}

impl StreakDto {
    pub fn from_record(record: &StreakRecord, thresholds: &MilestoneThresholds) -> Self {
        Self {
            user_id: record.user_id().as_str().to_string(),
            streak_type: record.streak_type(),
            current_streak: record.current_streak(),
            longest_streak: record.longest_streak(),
            last_activity: record.last_activity().to_rfc3339(),
            freezes_used: record.freezes_used(),
            max_freezes: record.max_freezes(),
            freezes_remaining: record.freezes_remaining(),
            last_freeze_at: record.last_freeze_at().map(|at| at.to_rfc3339()),
            next_milestone: thresholds.next_after(record.current_streak()),
        }
    }
}
