use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::{DomainError, UserId};

/// Activity category a streak is tracked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakType {
    Login,
    Challenge,
    SkillPractice,
}

impl StreakType {
    pub const ALL: [StreakType; 3] = [
        StreakType::Login,
        StreakType::Challenge,
        StreakType::SkillPractice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakType::Login => "login",
            StreakType::Challenge => "challenge",
            StreakType::SkillPractice => "skill_practice",
        }
    }

    /// Human readable label used in notification copy
    pub fn label(&self) -> &'static str {
        match self {
            StreakType::Login => "login",
            StreakType::Challenge => "challenge",
            StreakType::SkillPractice => "skill practice",
        }
    }
}

impl FromStr for StreakType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(StreakType::Login),
            "challenge" => Ok(StreakType::Challenge),
            "skill_practice" => Ok(StreakType::SkillPractice),
            _ => Err(DomainError::InvalidInput(format!(
                "Unknown streak type: {s}"
            ))),
        }
    }
}

impl fmt::Display for StreakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a streak record: one per (user, type)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreakKey {
    pub user_id: UserId,
    pub streak_type: StreakType,
}

impl StreakKey {
    pub fn new(user_id: UserId, streak_type: StreakType) -> Self {
        Self {
            user_id,
            streak_type,
        }
    }

    /// Persistence key, `{user_id}_{type}`
    pub fn document_id(&self) -> String {
        format!("{}_{}", self.user_id, self.streak_type)
    }
}

impl fmt::Display for StreakKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_type_parse_and_display() {
        for streak_type in StreakType::ALL {
            let parsed: StreakType = streak_type.as_str().parse().unwrap();
            assert_eq!(parsed, streak_type);
        }
        assert!("daily".parse::<StreakType>().is_err());
    }

    #[test]
    fn test_streak_type_serializes_snake_case() {
        let json = serde_json::to_string(&StreakType::SkillPractice).unwrap();
        assert_eq!(json, "\"skill_practice\"");
    }

    #[test]
    fn test_document_id() {
        let key = StreakKey::new(UserId::from_string("u1"), StreakType::SkillPractice);
        assert_eq!(key.document_id(), "u1_skill_practice");
    }
}
