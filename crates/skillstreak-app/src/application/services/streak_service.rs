use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::milestone_rewarder::{MilestoneRewarder, RewardReport};
use skillstreak_domain::shared::{DomainError, UserId};
use skillstreak_domain::streak::{
    apply_activity, StreakConfig, StreakKey, StreakPreferenceRepository, StreakRecord,
    StreakRepository, StreakType, Transition, TransitionFn, TransitionKind, TransitionPolicy,
};

/// Result of one committed (or stale, and therefore skipped) streak update
#[derive(Debug)]
pub struct StreakUpdateOutcome {
    pub record: StreakRecord,
    pub kind: TransitionKind,
    pub milestone: Option<u32>,
    /// Background reward task, present when a milestone was reached
    pub reward: Option<JoinHandle<RewardReport>>,
}

/// Streak application service
/// Applies activities transactionally and hands milestones to the rewarder
pub struct StreakService {
    streak_repo: Arc<dyn StreakRepository>,
    preference_repo: Arc<dyn StreakPreferenceRepository>,
    rewarder: Arc<MilestoneRewarder>,
    config: Arc<StreakConfig>,
}

impl StreakService {
    pub fn new(
        streak_repo: Arc<dyn StreakRepository>,
        preference_repo: Arc<dyn StreakPreferenceRepository>,
        rewarder: Arc<MilestoneRewarder>,
        config: Arc<StreakConfig>,
    ) -> Self {
        Self {
            streak_repo,
            preference_repo,
            rewarder,
            config,
        }
    }

    pub async fn update_user_streak(
        &self,
        user_id: &UserId,
        streak_type: StreakType,
    ) -> Result<StreakUpdateOutcome, DomainError> {
        self.update_user_streak_at(user_id, streak_type, Utc::now())
            .await
    }

    /// Apply an activity that happened at `activity_at`
    pub async fn update_user_streak_at(
        &self,
        user_id: &UserId,
        streak_type: StreakType,
        activity_at: DateTime<Utc>,
    ) -> Result<StreakUpdateOutcome, DomainError> {
        let key = StreakKey::new(user_id.clone(), streak_type);
        let auto_freeze = self.auto_freeze_for(user_id).await;
        let policy = TransitionPolicy::from_config(&self.config, auto_freeze);

        let compute =
            |existing: Option<&StreakRecord>| apply_activity(&key, existing, activity_at, &policy);
        let transition = self.transact_with_retry(&key, &compute).await?;

        info!(
            user_id = %user_id,
            streak_type = %streak_type,
            kind = ?transition.kind,
            current_streak = transition.record.current_streak(),
            longest_streak = transition.record.longest_streak(),
            freezes_used = transition.record.freezes_used(),
            milestone = ?transition.milestone,
            "Streak updated"
        );

        let reward = transition
            .milestone
            .map(|milestone| self.rewarder.dispatch(user_id.clone(), streak_type, milestone));

        Ok(StreakUpdateOutcome {
            record: transition.record,
            kind: transition.kind,
            milestone: transition.milestone,
            reward,
        })
    }

    pub async fn record_login(&self, user_id: &UserId) -> Option<StreakUpdateOutcome> {
        self.record_activity(user_id, StreakType::Login).await
    }

    pub async fn record_challenge_completion(
        &self,
        user_id: &UserId,
    ) -> Option<StreakUpdateOutcome> {
        self.record_activity(user_id, StreakType::Challenge).await
    }

    pub async fn record_skill_practice(&self, user_id: &UserId) -> Option<StreakUpdateOutcome> {
        self.record_activity(user_id, StreakType::SkillPractice)
            .await
    }

    /// Streak bookkeeping must never fail the login/challenge/practice that triggered it
    async fn record_activity(
        &self,
        user_id: &UserId,
        streak_type: StreakType,
    ) -> Option<StreakUpdateOutcome> {
        match self.update_user_streak(user_id, streak_type).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    streak_type = %streak_type,
                    error = %e.format_with_code(),
                    "Streak update failed, activity not counted"
                );
                None
            }
        }
    }

    async fn auto_freeze_for(&self, user_id: &UserId) -> bool {
        match self.preference_repo.auto_freeze_enabled(user_id).await {
            Ok(Some(enabled)) => enabled,
            Ok(None) => self.config.auto_freeze_default,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    default = self.config.auto_freeze_default,
                    "Auto-freeze preference lookup failed, using default"
                );
                self.config.auto_freeze_default
            }
        }
    }

    async fn transact_with_retry(
        &self,
        key: &StreakKey,
        compute: &TransitionFn<'_>,
    ) -> Result<Transition, DomainError> {
        let retry = &self.config.retry;
        let mut attempt = 1;

        loop {
            match self.streak_repo.transact(key, compute).await {
                Ok(transition) => {
                    if attempt > 1 {
                        debug!(key = %key, attempt, "Streak committed after retry");
                    }
                    return Ok(transition);
                }
                Err(e) if e.is_conflict() && attempt < retry.max_attempts => {
                    let delay = with_jitter(retry.backoff_for(attempt));
                    debug!(
                        key = %key,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Streak write conflicted, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        key = %key,
                        attempt,
                        error = %e.format_with_code(),
                        "Streak transaction failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// Add up to 50% random jitter so retrying writers spread out
fn with_jitter(base: Duration) -> Duration {
    let millis = base.as_millis() as u64;
    if millis == 0 {
        return base;
    }
    let jitter = rand::thread_rng().gen_range(0..=millis / 2);
    base + Duration::from_millis(jitter)
}
