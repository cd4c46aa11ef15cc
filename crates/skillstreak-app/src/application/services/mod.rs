mod milestone_rewarder;
mod streak_service;


pub use milestone_rewarder::{MilestoneRewarder, RewardReport};
pub use streak_service::{StreakService, StreakUpdateOutcome};
