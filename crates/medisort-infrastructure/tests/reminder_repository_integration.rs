use chrono::Weekday;
use std::sync::Arc;

use medisort_domain::reminder::{MedicationRef, Reminder, ReminderRepository};
use medisort_domain::shared::{DomainError, MedicationId, ReminderId, UserId};
use medisort_infrastructure::persistence::repositories::SqliteReminderRepository;

mod test_helpers;

fn reminder(user: &UserId, name: &str, time: &str, days: Vec<Weekday>) -> Reminder {
    Reminder::new(
        user.clone(),
        name.to_string(),
        time.parse().expect("valid time"),
        days,
        vec![
            MedicationRef::new(MedicationId::from_string("med-1"), "Aspirin"),
            MedicationRef::new(MedicationId::from_string("med-2"), "Metformin"),
        ],
    )
    .expect("create reminder")
}

#[tokio::test]
async fn reminder_repo_save_find_and_update_integration() {
    let (pool, _dir) = test_helpers::setup_db().await;
    let repo = SqliteReminderRepository::new(Arc::new(pool));

    let user = UserId::new();
    let mut saved = reminder(&user, "Breakfast", "08:00", vec![Weekday::Mon, Weekday::Fri]);
    repo.save(&saved).await.expect("save reminder");

    let fetched = repo
        .find_by_id(saved.id())
        .await
        .expect("find")
        .expect("should exist");
    assert_eq!(fetched.name(), "Breakfast");
    assert_eq!(fetched.time().to_string(), "08:00");
    assert_eq!(fetched.days(), &[Weekday::Mon, Weekday::Fri]);
    assert_eq!(fetched.medications().len(), 2);
    assert_eq!(fetched.medications()[1].name, "Metformin");

    saved.set_taking_medication(false);
    repo.save(&saved).await.expect("update reminder");

    let updated = repo
        .find_by_id(saved.id())
        .await
        .expect("find")
        .expect("should exist");
    assert!(!updated.is_taking_medication());
}

#[tokio::test]
async fn reminder_repo_active_filter_integration() {
    let (pool, _dir) = test_helpers::setup_db().await;
    let repo = SqliteReminderRepository::new(Arc::new(pool));

    let user = UserId::new();
    let active = reminder(&user, "Evening", "20:00", vec![Weekday::Tue]);
    let no_days = reminder(&user, "Someday", "12:00", vec![]);
    let mut paused = reminder(&user, "Paused", "07:00", vec![Weekday::Wed]);
    paused.set_taking_medication(false);
    let foreign = reminder(&UserId::new(), "Other", "09:00", vec![Weekday::Tue]);

    for r in [&active, &no_days, &paused, &foreign] {
        repo.save(r).await.expect("save");
    }

    let all = repo.find_by_user(&user).await.expect("find all");
    assert_eq!(all.len(), 3);

    let found = repo.find_active_by_user(&user).await.expect("find active");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), active.id());
}

#[tokio::test]
async fn reminder_repo_delete_integration() {
    let (pool, _dir) = test_helpers::setup_db().await;
    let repo = SqliteReminderRepository::new(Arc::new(pool));

    let user = UserId::new();
    let saved = reminder(&user, "Night", "22:30", vec![Weekday::Sun]);
    repo.save(&saved).await.expect("save");

    repo.delete(saved.id()).await.expect("delete");
    assert!(repo.find_by_id(saved.id()).await.expect("find").is_none());

    let err = repo
        .delete(&ReminderId::from_string("missing"))
        .await
        .expect_err("missing reminder");
    assert!(matches!(err, DomainError::ReminderNotFound(_)));
}
