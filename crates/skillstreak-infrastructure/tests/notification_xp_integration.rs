use serde_json::json;

use skillstreak_domain::notification::{NewNotification, NotificationKind, NotificationRepository};
use skillstreak_domain::shared::{DomainError, NotificationId, UserId};
use skillstreak_domain::streak::StreakPreferenceRepository;
use skillstreak_domain::xp::{XpLedger, XpSource};
use skillstreak_infrastructure::notification::SqliteNotificationRepository;
use skillstreak_infrastructure::persistence::repositories::{
    SqliteStreakPreferenceRepository, SqliteXpLedger,
};

mod test_helpers;
use test_helpers::setup_in_memory_db;

fn milestone_notification(user: &UserId, milestone: u32) -> NewNotification {
    NewNotification {
        recipient_id: user.clone(),
        kind: NotificationKind::StreakMilestone,
        title: format!("{milestone}-day login streak!"),
        message: format!("You logged in {milestone} days in a row."),
        data: json!({ "streakType": "login", "milestone": milestone }),
    }
}

#[tokio::test]
async fn notification_repo_create_list_and_mark_read() {
    let pool = setup_in_memory_db().await;
    let repo = SqliteNotificationRepository::new(pool);
    let user = UserId::from_string("alice");

    let created = repo.create(milestone_notification(&user, 7)).await.unwrap();
    assert!(!created.is_read());

    let listed = repo.find_by_recipient(&user).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), created.id());
    assert_eq!(listed[0].kind(), NotificationKind::StreakMilestone);
    assert_eq!(listed[0].data()["milestone"], 7);

    repo.mark_read(created.id()).await.unwrap();
    let listed = repo.find_by_recipient(&user).await.unwrap();
    assert!(listed[0].is_read());

    let missing = repo.mark_read(&NotificationId::new()).await.unwrap_err();
    assert!(matches!(missing, DomainError::NotFound(_)));
}

#[tokio::test]
async fn notification_repo_rejects_empty_title() {
    let pool = setup_in_memory_db().await;
    let repo = SqliteNotificationRepository::new(pool);
    let user = UserId::from_string("bob");

    let mut payload = milestone_notification(&user, 3);
    payload.title = "  ".to_string();

    assert!(repo.create(payload).await.is_err());
    assert!(repo.find_by_recipient(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn xp_ledger_awards_and_sums() {
    let pool = setup_in_memory_db().await;
    let ledger = SqliteXpLedger::new(pool);
    let user = UserId::from_string("carol");

    assert_eq!(ledger.total_for_user(&user).await.unwrap(), 0);

    let entry = ledger
        .award_xp(&user, 50, XpSource::StreakMilestone, "carol_login", "3-day login streak")
        .await
        .unwrap();
    assert_eq!(entry.amount, 50);
    assert_eq!(entry.reference_id, "carol_login");

    ledger
        .award_xp(&user, 50, XpSource::StreakMilestone, "carol_login", "7-day login streak")
        .await
        .unwrap();

    assert_eq!(ledger.total_for_user(&user).await.unwrap(), 100);
    assert_eq!(
        ledger.total_for_user(&UserId::from_string("dave")).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn xp_ledger_rejects_non_positive_amount() {
    let pool = setup_in_memory_db().await;
    let ledger = SqliteXpLedger::new(pool);
    let user = UserId::from_string("erin");

    let err = ledger
        .award_xp(&user, 0, XpSource::StreakMilestone, "erin_login", "nothing")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn preference_repo_upserts_flag() {
    let pool = setup_in_memory_db().await;
    let repo = SqliteStreakPreferenceRepository::new(pool);
    let user = UserId::from_string("frank");

    assert_eq!(repo.auto_freeze_enabled(&user).await.unwrap(), None);

    repo.set_auto_freeze(&user, false).await.unwrap();
    assert_eq!(repo.auto_freeze_enabled(&user).await.unwrap(), Some(false));

    repo.set_auto_freeze(&user, true).await.unwrap();
    assert_eq!(repo.auto_freeze_enabled(&user).await.unwrap(), Some(true));
}
