use log::info;
use std::sync::Arc;

use crate::application::dtos::StreakDto;
use skillstreak_domain::shared::{DomainError, UserId};
use skillstreak_domain::streak::{
    StreakConfig, StreakKey, StreakPreferenceRepository, StreakRepository, StreakType,
};

pub struct StreakQueries {
    streak_repo: Arc<dyn StreakRepository>,
    preference_repo: Arc<dyn StreakPreferenceRepository>,
    config: Arc<StreakConfig>,
}

impl StreakQueries {
    pub fn new(
        streak_repo: Arc<dyn StreakRepository>,
        preference_repo: Arc<dyn StreakPreferenceRepository>,
        config: Arc<StreakConfig>,
    ) -> Self {
        Self {
            streak_repo,
            preference_repo,
            config,
        }
    }

    pub async fn get_streak(
        &self,
        user_id: &UserId,
        streak_type: StreakType,
    ) -> Result<Option<StreakDto>, DomainError> {
        let key = StreakKey::new(user_id.clone(), streak_type);
        let record = self.streak_repo.find(&key).await?;

        Ok(record.map(|r| StreakDto::from_record(&r, &self.config.milestone_thresholds)))
    }

    /// All streaks of a user, longest running first
    pub async fn get_user_streaks(&self, user_id: &UserId) -> Result<Vec<StreakDto>, DomainError> {
        let mut results: Vec<StreakDto> = self
            .streak_repo
            .find_by_user(user_id)
            .await?
            .iter()
            .map(|r| StreakDto::from_record(r, &self.config.milestone_thresholds))
            .collect();

        results.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));

        info!(
            "[streak] get_user_streaks user_id={} total={}",
            user_id,
            results.len()
        );
        Ok(results)
    }

    /// Stored preference, or the configured default when the user never chose
    pub async fn get_auto_freeze(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self
            .preference_repo
            .auto_freeze_enabled(user_id)
            .await?
            .unwrap_or(self.config.auto_freeze_default))
    }

    pub async fn set_auto_freeze(&self, user_id: &UserId, enabled: bool) -> Result<(), DomainError> {
        self.preference_repo.set_auto_freeze(user_id, enabled).await?;
        info!(
            "[streak] set_auto_freeze user_id={} enabled={}",
            user_id, enabled
        );
        Ok(())
    }
}
