use chrono::{FixedOffset, Local, Offset};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use skillstreak_domain::streak::{
    offset_from_minutes, parse_flag, MilestoneThresholds, RetryPolicy, StreakConfig,
};

pub const ENV_MILESTONES: &str = "SKILLSTREAK_MILESTONES";
pub const ENV_MAX_FREEZES: &str = "SKILLSTREAK_MAX_FREEZES";
pub const ENV_AUTO_FREEZE: &str = "SKILLSTREAK_AUTO_FREEZE";
pub const ENV_MILESTONE_XP: &str = "SKILLSTREAK_MILESTONE_XP";
pub const ENV_UTC_OFFSET_MINUTES: &str = "SKILLSTREAK_UTC_OFFSET_MINUTES";
pub const ENV_RETRY_ATTEMPTS: &str = "SKILLSTREAK_RETRY_ATTEMPTS";

/// Settings file key for each environment variable
const FILE_KEYS: [(&str, &str); 6] = [
    ("milestones", ENV_MILESTONES),
    ("max_freezes", ENV_MAX_FREEZES),
    ("auto_freeze", ENV_AUTO_FREEZE),
    ("milestone_xp", ENV_MILESTONE_XP),
    ("utc_offset_minutes", ENV_UTC_OFFSET_MINUTES),
    ("retry_attempts", ENV_RETRY_ATTEMPTS),
];

/// Builds a `StreakConfig` from loosely typed sources.
///
/// Nothing here fails: a missing or unusable value keeps whatever the base
/// config already had, and the reason is logged.
pub struct StreakSettingsLoader;

impl StreakSettingsLoader {
    /// Defaults for a running process: like `StreakConfig::default()` but days
    /// roll over at local midnight
    pub fn process_defaults() -> StreakConfig {
        StreakConfig {
            day_boundary_offset: local_offset(),
            ..StreakConfig::default()
        }
    }

    /// Optional JSON file first, environment variables on top
    pub fn load(settings_file: Option<&Path>) -> StreakConfig {
        let base = match settings_file {
            Some(path) => Self::from_file(path, Self::process_defaults()),
            None => Self::process_defaults(),
        };
        let config = Self::apply(base, |key| std::env::var(key).ok());

        info!(
            milestones = ?config.milestone_thresholds.as_slice(),
            max_freezes = config.max_freezes,
            auto_freeze_default = config.auto_freeze_default,
            milestone_xp_bonus = config.milestone_xp_bonus,
            utc_offset_seconds = config.day_boundary_offset.local_minus_utc(),
            retry_attempts = config.retry.max_attempts,
            "Streak settings loaded"
        );

        config
    }

    pub fn from_env() -> StreakConfig {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> StreakConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::apply(Self::process_defaults(), lookup)
    }

    /// Read a JSON object such as `{"milestones": [3, 7], "max_freezes": 2}`.
    /// A missing or malformed file leaves `base` untouched.
    pub fn from_file(path: &Path, base: StreakConfig) -> StreakConfig {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Streak settings file unreadable, using defaults");
                return base;
            }
        };

        let object = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                warn!(path = %path.display(), "Streak settings file is not a JSON object, using defaults");
                return base;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Streak settings file is not valid JSON, using defaults");
                return base;
            }
        };

        let values: HashMap<&str, String> = FILE_KEYS
            .iter()
            .filter_map(|(file_key, env_key)| {
                object.get(*file_key).and_then(value_to_raw).map(|raw| (*env_key, raw))
            })
            .collect();

        debug!(path = %path.display(), keys = values.len(), "Streak settings file read");
        Self::apply(base, |key| values.get(key).cloned())
    }

    /// Overlay every variable `lookup` yields onto `base`
    pub fn apply<F>(base: StreakConfig, lookup: F) -> StreakConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = base;

        if let Some(raw) = lookup(ENV_MILESTONES) {
            config.milestone_thresholds = MilestoneThresholds::parse_lenient(&raw);
            debug!(raw = %raw, parsed = ?config.milestone_thresholds.as_slice(), "milestones");
        }

        if let Some(raw) = lookup(ENV_MAX_FREEZES) {
            match raw.trim().parse::<u32>() {
                Ok(value) => config.max_freezes = value,
                Err(_) => rejected(ENV_MAX_FREEZES, &raw),
            }
        }

        if let Some(raw) = lookup(ENV_AUTO_FREEZE) {
            match parse_flag(&raw) {
                Some(value) => config.auto_freeze_default = value,
                None => rejected(ENV_AUTO_FREEZE, &raw),
            }
        }

        if let Some(raw) = lookup(ENV_MILESTONE_XP) {
            match raw.trim().parse::<i64>() {
                Ok(value) if value > 0 => config.milestone_xp_bonus = value,
                _ => rejected(ENV_MILESTONE_XP, &raw),
            }
        }

        if let Some(raw) = lookup(ENV_UTC_OFFSET_MINUTES) {
            match raw.trim().parse::<i32>().ok().and_then(offset_from_minutes) {
                Some(offset) => config.day_boundary_offset = offset,
                None => rejected(ENV_UTC_OFFSET_MINUTES, &raw),
            }
        }

        if let Some(raw) = lookup(ENV_RETRY_ATTEMPTS) {
            match raw.trim().parse::<u32>() {
                Ok(value) if value > 0 => {
                    config.retry = RetryPolicy::new(
                        value,
                        config.retry.initial_backoff,
                        config.retry.max_backoff,
                    )
                }
                _ => rejected(ENV_RETRY_ATTEMPTS, &raw),
            }
        }

        config
    }
}

fn rejected(key: &str, raw: &str) {
    warn!(key, raw, "Ignoring malformed streak setting");
}

fn value_to_raw(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_raw)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Null | Value::Object(_) => None,
    }
}

fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}
