use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::queries::StreakQueries;
use crate::application::services::{MilestoneRewarder, StreakService};
use skillstreak_domain::events::EventBus;
use skillstreak_domain::notification::NotificationRepository;
use skillstreak_domain::streak::{StreakConfig, StreakPreferenceRepository, StreakRepository};
use skillstreak_domain::xp::XpLedger;
use skillstreak_infrastructure::config::StreakSettingsLoader;
use skillstreak_infrastructure::events::InMemoryEventBus;
use skillstreak_infrastructure::logging::{default_log_dir, init_logger};
use skillstreak_infrastructure::notification::SqliteNotificationRepository;
use skillstreak_infrastructure::persistence::{
    repositories::{SqliteStreakPreferenceRepository, SqliteStreakRepository, SqliteXpLedger},
    Database,
};

const APP_DIR_NAME: &str = "skillstreak";
const SETTINGS_FILE: &str = "streak_settings.json";

/// Repositories container
pub struct Repositories {
    pub streak: Arc<dyn StreakRepository>,
    pub preference: Arc<dyn StreakPreferenceRepository>,
    pub notification: Arc<dyn NotificationRepository>,
    pub xp_ledger: Arc<dyn XpLedger>,
}

/// Everything a host process needs to record activities and read streaks
pub struct AppState {
    pub pool: Arc<SqlitePool>,
    pub config: Arc<StreakConfig>,
    /// Concrete bus so hosts can subscribe to milestone events
    pub event_bus: Arc<InMemoryEventBus>,
    pub repositories: Repositories,
    pub streak_service: Arc<StreakService>,
    pub streak_queries: Arc<StreakQueries>,
}

/// Wire services over an opened database, running migrations first
pub async fn build_app_state(database: Database, config: StreakConfig) -> anyhow::Result<AppState> {
    let started_at = Instant::now();
    database.run_migrations().await?;
    info!(
        "✓ Migrations completed ({}ms)",
        started_at.elapsed().as_millis()
    );

    let pool = Arc::new(database.pool().clone());
    let config = Arc::new(config);
    let event_bus = Arc::new(InMemoryEventBus::new());

    let repositories = Repositories {
        streak: Arc::new(SqliteStreakRepository::new(pool.clone())) as Arc<dyn StreakRepository>,
        preference: Arc::new(SqliteStreakPreferenceRepository::new(pool.clone()))
            as Arc<dyn StreakPreferenceRepository>,
        notification: Arc::new(SqliteNotificationRepository::new(pool.clone()))
            as Arc<dyn NotificationRepository>,
        xp_ledger: Arc::new(SqliteXpLedger::new(pool.clone())) as Arc<dyn XpLedger>,
    };

    let rewarder = Arc::new(MilestoneRewarder::new(
        repositories.xp_ledger.clone(),
        repositories.notification.clone(),
        event_bus.clone() as Arc<dyn EventBus>,
        config.milestone_xp_bonus,
    ));

    let streak_service = Arc::new(StreakService::new(
        repositories.streak.clone(),
        repositories.preference.clone(),
        rewarder,
        config.clone(),
    ));

    let streak_queries = Arc::new(StreakQueries::new(
        repositories.streak.clone(),
        repositories.preference.clone(),
        config.clone(),
    ));

    Ok(AppState {
        pool,
        config,
        event_bus,
        repositories,
        streak_service,
        streak_queries,
    })
}

/// Data directory for the database, settings file and logs
pub fn app_data_dir() -> anyhow::Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve the user data directory"))
}

/// Standard startup: logger, settings file plus environment, file database
pub async fn build_default_app_state() -> anyhow::Result<AppState> {
    let startup_started_at = Instant::now();

    let data_dir = app_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    init_logger(default_log_dir(&data_dir))?;

    let settings_path = data_dir.join(SETTINGS_FILE);
    let config = StreakSettingsLoader::load(settings_path.exists().then_some(settings_path.as_path()));

    let db_filename = if cfg!(debug_assertions) {
        "skillstreak-dev.db"
    } else {
        "skillstreak.db"
    };
    let db_path = data_dir.join(db_filename);
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid database path"))?;
    info!("Database path: {}", db_path_str);

    let database = Database::new(db_path_str).await?;
    let state = build_app_state(database, config).await?;

    info!(
        "✓ Streak services ready ({}ms)",
        startup_started_at.elapsed().as_millis()
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillstreak_domain::shared::UserId;
    use skillstreak_domain::streak::StreakType;

    #[tokio::test]
    async fn test_build_app_state_in_memory() {
        let database = Database::in_memory().await.unwrap();
        let state = build_app_state(database, StreakConfig::default())
            .await
            .unwrap();

        let user = UserId::from_string("bootstrap-user");
        let outcome = state.streak_service.record_login(&user).await.unwrap();
        assert_eq!(outcome.record.current_streak(), 1);

        let dto = state
            .streak_queries
            .get_streak(&user, StreakType::Login)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dto.current_streak, 1);
        assert_eq!(dto.next_milestone, Some(3));
    }
}
