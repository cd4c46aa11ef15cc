use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::events::DomainEvent;
use crate::shared::UserId;
use crate::streak::StreakType;

/// Macro to implement DomainEvent trait with type name
macro_rules! impl_domain_event {
    ($type:ty) => {
        impl DomainEvent for $type {
            fn as_any(&self) -> &(dyn Any + Send + Sync) {
                self
            }

            fn event_type_name(&self) -> &'static str {
                std::any::type_name::<Self>()
            }
        }
    };
}

pub const STREAK_MILESTONE_EVENT: &str = "streak_milestone";

/// Fired after a committed update reaches a milestone, for live subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakMilestoneReached {
    #[serde(rename = "type")]
    pub event_type: String,
    pub user_id: UserId,
    pub streak_type: StreakType,
    pub milestone: u32,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl StreakMilestoneReached {
    pub fn new(
        user_id: UserId,
        streak_type: StreakType,
        milestone: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event_type: STREAK_MILESTONE_EVENT.to_string(),
            user_id,
            streak_type,
            milestone,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl_domain_event!(StreakMilestoneReached);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_event_wire_shape() {
        let event = StreakMilestoneReached::new(
            UserId::from_string("u1"),
            StreakType::Challenge,
            14,
            "14-day challenge streak!",
        );
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "streak_milestone");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["streakType"], "challenge");
        assert_eq!(json["milestone"], 14);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_downcast_through_as_any() {
        let event: Box<dyn DomainEvent> = Box::new(StreakMilestoneReached::new(
            UserId::from_string("u1"),
            StreakType::Login,
            3,
            "3-day login streak!",
        ));
        let typed = event
            .as_any()
            .downcast_ref::<StreakMilestoneReached>()
            .unwrap();
        assert_eq!(typed.milestone, 3);
        assert!(event.event_type_name().ends_with("StreakMilestoneReached"));
    }
}
