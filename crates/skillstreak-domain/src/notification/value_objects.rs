use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::{DomainError, UserId};

/// Notification category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StreakMilestone,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::StreakMilestone => "streak_milestone",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "streak_milestone" => Ok(NotificationKind::StreakMilestone),
            _ => Err(DomainError::InvalidInput(format!(
                "Unknown notification kind: {s}"
            ))),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload for creating a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}

impl NewNotification {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.recipient_id.as_str().trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Notification recipient cannot be empty".to_string(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Notification title cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_roundtrip() {
        let kind: NotificationKind = "streak_milestone".parse().unwrap();
        assert_eq!(kind, NotificationKind::StreakMilestone);
        assert!("trade_request".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_validate_requires_title() {
        let notification = NewNotification {
            recipient_id: UserId::from_string("u1"),
            kind: NotificationKind::StreakMilestone,
            title: "  ".to_string(),
            message: "body".to_string(),
            data: json!({}),
        };
        assert!(notification.validate().is_err());
    }
}
