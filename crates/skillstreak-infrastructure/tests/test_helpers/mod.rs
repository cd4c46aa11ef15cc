#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use skillstreak_domain::shared::UserId;
use skillstreak_domain::streak::{
    apply_activity, StreakConfig, StreakKey, StreakType, Transition, TransitionPolicy,
};
use skillstreak_infrastructure::persistence::Database;

/// Migrated private in-memory database
pub async fn setup_in_memory_db() -> Arc<SqlitePool> {
    let db = Database::in_memory().await.expect("open in-memory db");
    db.run_migrations().await.expect("run migrations");
    Arc::new(db.pool().clone())
}

/// Migrated file database under `dir`, with a real connection pool
pub async fn setup_file_db(dir: &std::path::Path) -> Arc<SqlitePool> {
    let path = dir.join("streaks.db");
    let db = Database::new(path.to_str().expect("utf-8 temp path"))
        .await
        .expect("open file db");
    db.run_migrations().await.expect("run migrations");
    Arc::new(db.pool().clone())
}

pub fn login_key(user: &str) -> StreakKey {
    StreakKey::new(UserId::from_string(user), StreakType::Login)
}

/// Midday UTC on the given day of May 2024
pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, n, 12, 0, 0).unwrap()
}

pub fn compute_at(
    key: &StreakKey,
    at: DateTime<Utc>,
) -> impl Fn(Option<&skillstreak_domain::streak::StreakRecord>) -> Transition + Send + Sync + '_ {
    let policy = TransitionPolicy::from_config(&StreakConfig::default(), true);
    move |existing| apply_activity(key, existing, at, &policy)
}
