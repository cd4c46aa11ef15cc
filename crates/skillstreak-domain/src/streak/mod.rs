mod aggregate;
mod config;
mod repository;
mod transition;
mod value_objects;


pub use aggregate::StreakRecord;
pub use config::{
    offset_from_minutes, parse_flag, MilestoneThresholds, RetryPolicy, StreakConfig,
    DEFAULT_AUTO_FREEZE, DEFAULT_MAX_FREEZES, DEFAULT_MILESTONES, DEFAULT_MILESTONE_XP,
};
pub use repository::{StreakPreferenceRepository, StreakRepository, TransitionFn};
pub use transition::{apply_activity, diff_days, Transition, TransitionKind, TransitionPolicy};
pub use value_objects::{StreakKey, StreakType};
