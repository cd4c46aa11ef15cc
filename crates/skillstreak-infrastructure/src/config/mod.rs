mod streak_settings;

pub use streak_settings::{
    StreakSettingsLoader, ENV_AUTO_FREEZE, ENV_MAX_FREEZES, ENV_MILESTONES, ENV_MILESTONE_XP,
    ENV_RETRY_ATTEMPTS, ENV_UTC_OFFSET_MINUTES,
};
