use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{StreakKey, StreakType};
use crate::shared::{DomainError, UserId};

/// Persisted streak for one (user, type) pair
///
/// Only the transition engine produces new states; repositories restore
/// and persist them. `version` increases by one on every committed write
/// and is what optimistic writes are checked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    user_id: UserId,
    streak_type: StreakType,
    current_streak: u32,
    longest_streak: u32,
    last_activity: DateTime<Utc>,
    freezes_used: u32,
    max_freezes: u32,
    last_freeze_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: i64,
}

impl StreakRecord {
    /// First qualifying activity for a key
    pub fn start(key: StreakKey, activity_at: DateTime<Utc>, max_freezes: u32) -> Self {
        Self {
            user_id: key.user_id,
            streak_type: key.streak_type,
            current_streak: 1,
            longest_streak: 1,
            last_activity: activity_at,
            freezes_used: 0,
            max_freezes,
            last_freeze_at: None,
            created_at: activity_at,
            updated_at: activity_at,
            version: 0,
        }
    }

    /// Reconstruct from persistence, rejecting rows that break the record invariants
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        user_id: UserId,
        streak_type: StreakType,
        current_streak: u32,
        longest_streak: u32,
        last_activity: DateTime<Utc>,
        freezes_used: u32,
        max_freezes: u32,
        last_freeze_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i64,
    ) -> Result<Self, DomainError> {
        if longest_streak < current_streak {
            return Err(DomainError::DataIntegrity(format!(
                "longest streak {} below current streak {} for {}_{}",
                longest_streak, current_streak, user_id, streak_type
            )));
        }
        if freezes_used > max_freezes {
            return Err(DomainError::DataIntegrity(format!(
                "freezes used {} above limit {} for {}_{}",
                freezes_used, max_freezes, user_id, streak_type
            )));
        }

        Ok(Self {
            user_id,
            streak_type,
            current_streak,
            longest_streak,
            last_activity,
            freezes_used,
            max_freezes,
            last_freeze_at,
            created_at,
            updated_at,
            version,
        })
    }

    // Getters
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn streak_type(&self) -> StreakType {
        self.streak_type
    }

    pub fn key(&self) -> StreakKey {
        StreakKey::new(self.user_id.clone(), self.streak_type)
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn freezes_used(&self) -> u32 {
        self.freezes_used
    }

    pub fn max_freezes(&self) -> u32 {
        self.max_freezes
    }

    pub fn freezes_remaining(&self) -> u32 {
        self.max_freezes.saturating_sub(self.freezes_used)
    }

    pub fn last_freeze_at(&self) -> Option<DateTime<Utc>> {
        self.last_freeze_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Whether this record has never been written
    pub fn is_new(&self) -> bool {
        self.version == 0
    }

    // State changes, driven by the transition engine

    pub(super) fn touch(&mut self, activity_at: DateTime<Utc>) {
        if activity_at > self.last_activity {
            self.last_activity = activity_at;
        }
        self.updated_at = activity_at.max(self.updated_at);
    }

    pub(super) fn extend(&mut self, activity_at: DateTime<Utc>) {
        self.current_streak += 1;
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.touch(activity_at);
    }

    pub(super) fn consume_freeze(&mut self, activity_at: DateTime<Utc>) {
        self.freezes_used += 1;
        self.last_freeze_at = Some(activity_at);
    }

    pub(super) fn reset(&mut self, activity_at: DateTime<Utc>) {
        self.current_streak = 1;
        self.touch(activity_at);
    }

    pub(super) fn bump_version(&mut self) {
        self.version += 1;
    }
}
