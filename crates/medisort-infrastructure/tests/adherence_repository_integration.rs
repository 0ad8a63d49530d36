use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use medisort_domain::adherence::{AdherenceRecord, AdherenceRepository, AdherenceStatus};
use medisort_domain::shared::{DomainError, MedicationId, ReminderId, UserId};
use medisort_infrastructure::persistence::repositories::SqliteAdherenceRepository;

mod test_helpers;

fn record(
    user: &UserId,
    reminder: &str,
    status: AdherenceStatus,
    at: DateTime<Utc>,
) -> AdherenceRecord {
    AdherenceRecord::new(
        ReminderId::from_string(reminder),
        MedicationId::from_string("med-1"),
        "Aspirin".to_string(),
        user.clone(),
        status,
        at - Duration::minutes(5),
        at,
    )
    .expect("create record")
}

#[tokio::test]
async fn adherence_repo_save_and_find_by_id_integration() {
    let (pool, _dir) = test_helpers::setup_db().await;
    let repo = SqliteAdherenceRepository::new(Arc::new(pool));

    let user = UserId::new();
    let at = Utc.with_ymd_and_hms(2024, 6, 3, 8, 30, 0).unwrap();
    let saved = record(&user, "reminder-1", AdherenceStatus::Snoozed, at);

    repo.save(&saved).await.expect("save record");

    let fetched = repo
        .find_by_id(saved.id())
        .await
        .expect("find")
        .expect("should exist");

    assert_eq!(fetched, saved);
    assert_eq!(fetched.status(), AdherenceStatus::Snoozed);
    assert_eq!(fetched.medication_name(), "Aspirin");
}

#[tokio::test]
async fn adherence_repo_rejects_duplicate_id_integration() {
    let (pool, _dir) = test_helpers::setup_db().await;
    let repo = SqliteAdherenceRepository::new(Arc::new(pool));

    let user = UserId::new();
    let saved = record(&user, "reminder-1", AdherenceStatus::Taken, Utc::now());
    repo.save(&saved).await.expect("first save");

    let err = repo.save(&saved).await.expect_err("duplicate must fail");
    assert!(matches!(err, DomainError::DataIntegrity(_)), "got {:?}", err);
}

#[tokio::test]
async fn adherence_repo_range_is_half_open_and_ordered_integration() {
    let (pool, _dir) = test_helpers::setup_db().await;
    let repo = SqliteAdherenceRepository::new(Arc::new(pool));

    let user = UserId::new();
    let other = UserId::new();
    let start = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
    let end = start + Duration::days(1);

    let late = record(&user, "r-late", AdherenceStatus::Taken, start + Duration::hours(20));
    let early = record(&user, "r-early", AdherenceStatus::Missed, start);
    let next_day = record(&user, "r-next", AdherenceStatus::Taken, end);
    let foreign = record(&other, "r-other", AdherenceStatus::Taken, start + Duration::hours(1));

    for r in [&late, &early, &next_day, &foreign] {
        repo.save(r).await.expect("save");
    }

    let found = repo
        .find_by_user_in_range(&user, start, end)
        .await
        .expect("range query");

    let reminders: Vec<&str> = found.iter().map(|r| r.reminder_id().as_str()).collect();
    assert_eq!(reminders, vec!["r-early", "r-late"]);
}
