use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use skillstreak_domain::events::{EventHandler, StreakMilestoneReached, TypedEventHandlerWrapper};
use skillstreak_domain::shared::{DomainError, UserId};
use skillstreak_domain::streak::{StreakConfig, StreakType, TransitionKind};
use skillstreak_domain::xp::XpLedger;
use skillstreak_infrastructure::persistence::Database;
use skillstreak_lib::bootstrap::{build_app_state, AppState};

fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, n, 9, 30, 0).unwrap()
}

async fn app() -> AppState {
    let database = Database::in_memory().await.expect("in-memory db");
    build_app_state(database, StreakConfig::default())
        .await
        .expect("app state")
}

struct MilestoneCollector {
    seen: Arc<Mutex<Vec<u32>>>,
}

#[async_trait]
impl EventHandler<StreakMilestoneReached> for MilestoneCollector {
    async fn handle(&self, event: &StreakMilestoneReached) -> Result<(), DomainError> {
        self.seen.lock().unwrap().push(event.milestone);
        Ok(())
    }
}

/// Run one activity and wait for any reward it triggered
async fn login_on(state: &AppState, user: &UserId, n: u32) -> (TransitionKind, u32, Option<u32>) {
    let outcome = state
        .streak_service
        .update_user_streak_at(user, StreakType::Login, day(n))
        .await
        .expect("streak update");

    if let Some(reward) = outcome.reward {
        assert!(reward.await.expect("reward task").is_complete());
    }
    (
        outcome.kind,
        outcome.record.current_streak(),
        outcome.milestone,
    )
}

#[tokio::test]
async fn daily_logins_reach_milestones_and_grant_rewards() {
    let state = app().await;
    let user = UserId::from_string("learner");
    let seen = Arc::new(Mutex::new(Vec::new()));
    state
        .event_bus
        .subscribe::<StreakMilestoneReached>(Arc::new(TypedEventHandlerWrapper::<StreakMilestoneReached, _>::new(
            MilestoneCollector { seen: seen.clone() },
        )))
        .await;

    assert_eq!(login_on(&state, &user, 1).await, (TransitionKind::Started, 1, None));
    for n in 2..=6 {
        login_on(&state, &user, n).await;
    }

    // Scenario B: 6/6/0/1, next day reaches 7
    assert_eq!(
        login_on(&state, &user, 7).await,
        (TransitionKind::Continued, 7, Some(7))
    );

    assert_eq!(*seen.lock().unwrap(), vec![3, 7]);
    assert_eq!(
        state
            .repositories
            .xp_ledger
            .total_for_user(&user)
            .await
            .unwrap(),
        100
    );

    let notifications = state
        .repositories
        .notification
        .find_by_recipient(&user)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 2);
    assert!(notifications.iter().all(|n| !n.is_read()));

    let dto = state
        .streak_queries
        .get_streak(&user, StreakType::Login)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dto.current_streak, 7);
    assert_eq!(dto.longest_streak, 7);
    assert_eq!(dto.next_milestone, Some(14));
    assert_eq!(dto.freezes_remaining, 1);
}

#[tokio::test]
async fn freeze_bridges_one_gap_then_a_second_gap_resets() {
    let state = app().await;
    let user = UserId::from_string("gappy");

    for n in 1..=13 {
        login_on(&state, &user, n).await;
    }

    // Scenario C: 13 with a freeze left, day 14 skipped
    assert_eq!(
        login_on(&state, &user, 15).await,
        (TransitionKind::FreezeBridged, 14, Some(14))
    );

    let dto = state
        .streak_queries
        .get_streak(&user, StreakType::Login)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dto.freezes_used, 1);
    assert_eq!(dto.freezes_remaining, 0);
    assert!(dto.last_freeze_at.is_some());

    // Scenario D: no freeze left, two-day gap resets
    assert_eq!(
        login_on(&state, &user, 17).await,
        (TransitionKind::Reset, 1, None)
    );

    let dto = state
        .streak_queries
        .get_streak(&user, StreakType::Login)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dto.current_streak, 1);
    assert_eq!(dto.longest_streak, 14);
    assert_eq!(dto.freezes_used, 1);
}

#[tokio::test]
async fn auto_freeze_preference_round_trip_changes_behaviour() {
    let state = app().await;
    let user = UserId::from_string("strict");

    assert!(state.streak_queries.get_auto_freeze(&user).await.unwrap());
    state
        .streak_queries
        .set_auto_freeze(&user, false)
        .await
        .unwrap();
    assert!(!state.streak_queries.get_auto_freeze(&user).await.unwrap());

    login_on(&state, &user, 1).await;
    login_on(&state, &user, 2).await;
    assert_eq!(
        login_on(&state, &user, 4).await,
        (TransitionKind::Reset, 1, None)
    );
}

#[tokio::test]
async fn user_streaks_are_listed_longest_running_first() {
    let state = app().await;
    let user = UserId::from_string("multi");

    for n in 1..=2 {
        state
            .streak_service
            .update_user_streak_at(&user, StreakType::Challenge, day(n))
            .await
            .unwrap();
    }
    state
        .streak_service
        .update_user_streak_at(&user, StreakType::Login, day(2))
        .await
        .unwrap();

    let streaks = state.streak_queries.get_user_streaks(&user).await.unwrap();
    let summary: Vec<(StreakType, u32)> = streaks
        .iter()
        .map(|s| (s.streak_type, s.current_streak))
        .collect();
    assert_eq!(
        summary,
        vec![(StreakType::Challenge, 2), (StreakType::Login, 1)]
    );
}
