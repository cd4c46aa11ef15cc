use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use skillstreak_domain::events::{EventBus, StreakMilestoneReached};
use skillstreak_domain::notification::{NewNotification, NotificationKind, NotificationRepository};
use skillstreak_domain::shared::{NotificationId, UserId, XpTransactionId};
use skillstreak_domain::streak::{StreakKey, StreakType};
use skillstreak_domain::xp::{XpLedger, XpSource};

/// What a milestone dispatch managed to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardReport {
    pub user_id: UserId,
    pub streak_type: StreakType,
    pub milestone: u32,
    pub xp_transaction: Option<XpTransactionId>,
    pub notification: Option<NotificationId>,
    pub event_published: bool,
    /// One entry per failed step
    pub failures: Vec<String>,
}

impl RewardReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Grants XP, stores a notification and publishes an event for a reached milestone.
/// The three steps are independent of each other and of the committed streak.
pub struct MilestoneRewarder {
    xp_ledger: Arc<dyn XpLedger>,
    notification_repo: Arc<dyn NotificationRepository>,
    event_bus: Arc<dyn EventBus>,
    xp_bonus: i64,
}

impl MilestoneRewarder {
    pub fn new(
        xp_ledger: Arc<dyn XpLedger>,
        notification_repo: Arc<dyn NotificationRepository>,
        event_bus: Arc<dyn EventBus>,
        xp_bonus: i64,
    ) -> Self {
        Self {
            xp_ledger,
            notification_repo,
            event_bus,
            xp_bonus,
        }
    }

    /// Run `on_milestone` on a background task
    pub fn dispatch(
        self: &Arc<Self>,
        user_id: UserId,
        streak_type: StreakType,
        milestone: u32,
    ) -> JoinHandle<RewardReport> {
        let rewarder = Arc::clone(self);
        tokio::spawn(async move { rewarder.on_milestone(&user_id, streak_type, milestone).await })
    }

    pub async fn on_milestone(
        &self,
        user_id: &UserId,
        streak_type: StreakType,
        milestone: u32,
    ) -> RewardReport {
        let reference_id = StreakKey::new(user_id.clone(), streak_type).document_id();
        let title = format!("{}-day {} streak!", milestone, streak_type.label());
        let message = format!(
            "You kept your {} streak going for {} days in a row.",
            streak_type.label(),
            milestone
        );

        let (xp, notification, event) = futures::join!(
            self.xp_ledger.award_xp(
                user_id,
                self.xp_bonus,
                XpSource::StreakMilestone,
                &reference_id,
                &title,
            ),
            self.notification_repo.create(NewNotification {
                recipient_id: user_id.clone(),
                kind: NotificationKind::StreakMilestone,
                title: title.clone(),
                message: message.clone(),
                data: json!({
                    "streakType": streak_type.as_str(),
                    "milestone": milestone,
                }),
            }),
            self.event_bus.publish(Box::new(StreakMilestoneReached::new(
                user_id.clone(),
                streak_type,
                milestone,
                message.clone(),
            ))),
        );

        let mut report = RewardReport {
            user_id: user_id.clone(),
            streak_type,
            milestone,
            xp_transaction: None,
            notification: None,
            event_published: false,
            failures: Vec::new(),
        };

        match xp {
            Ok(entry) => report.xp_transaction = Some(entry.id),
            Err(e) => {
                error!(
                    user_id = %user_id,
                    streak_type = %streak_type,
                    milestone,
                    error = %e.format_with_code(),
                    "Failed to award milestone XP"
                );
                report.failures.push(format!("xp: {}", e));
            }
        }

        match notification {
            Ok(created) => report.notification = Some(created.id().clone()),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    streak_type = %streak_type,
                    milestone,
                    error = %e.format_with_code(),
                    "Failed to store milestone notification"
                );
                report.failures.push(format!("notification: {}", e));
            }
        }

        match event {
            Ok(()) => report.event_published = true,
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    streak_type = %streak_type,
                    milestone,
                    error = %e,
                    "Failed to publish milestone event"
                );
                report.failures.push(format!("event: {}", e));
            }
        }

        info!(
            user_id = %user_id,
            streak_type = %streak_type,
            milestone,
            failures = report.failures.len(),
            "Milestone reward dispatched"
        );

        report
    }
}
