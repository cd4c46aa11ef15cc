use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::{DomainError, UserId, XpTransactionId};

/// Why XP was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
    StreakMilestone,
}

impl XpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            XpSource::StreakMilestone => "streak_milestone",
        }
    }
}

impl FromStr for XpSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "streak_milestone" => Ok(XpSource::StreakMilestone),
            _ => Err(DomainError::InvalidInput(format!("Unknown XP source: {s}"))),
        }
    }
}

impl fmt::Display for XpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpTransaction {
    pub id: XpTransactionId,
    pub user_id: UserId,
    pub amount: i64,
    pub source: XpSource,
    pub reference_id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl XpTransaction {
    pub fn new(
        user_id: UserId,
        amount: i64,
        source: XpSource,
        reference_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::Validation(format!(
                "XP award must be positive, got {amount}"
            )));
        }

        Ok(Self {
            id: XpTransactionId::new(),
            user_id,
            amount,
            source,
            reference_id: reference_id.into(),
            description: description.into(),
            created_at: Utc::now(),
        })
    }
}

/// XP ledger
#[async_trait]
pub trait XpLedger: Send + Sync {
    async fn award_xp(
        &self,
        user_id: &UserId,
        amount: i64,
        source: XpSource,
        reference_id: &str,
        description: &str,
    ) -> Result<XpTransaction, DomainError>;

    async fn total_for_user(&self, user_id: &UserId) -> Result<i64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_must_be_positive() {
        let result = XpTransaction::new(
            UserId::from_string("u1"),
            0,
            XpSource::StreakMilestone,
            "u1_login",
            "nothing",
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_new_transaction() {
        let tx = XpTransaction::new(
            UserId::from_string("u1"),
            50,
            XpSource::StreakMilestone,
            "u1_login",
            "7-day login streak",
        )
        .unwrap();
        assert_eq!(tx.amount, 50);
        assert_eq!(tx.source.as_str(), "streak_milestone");
        assert_eq!(tx.reference_id, "u1_login");
    }
}
