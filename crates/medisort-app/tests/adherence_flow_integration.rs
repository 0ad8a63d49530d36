mod test_helpers;

use chrono::Duration;
use test_helpers::*;

use medisort_domain::shared::{Clock, DomainError, ReminderId};
use medisort_domain::streak::UserStreak;
use medisort_lib::presentation::ipc::{dispatch, parse_line, IpcRequest};

async fn seed_streak(app: &TestApp, current: u32, last: chrono::NaiveDate) {
    app.state
        .repositories
        .streak
        .update_atomically(
            &user(),
            Box::new(move |_| {
                UserStreak::restore(user(), current, current, Some(last), None).unwrap()
            }),
        )
        .await
        .unwrap();
}

async fn send(app: &TestApp, line: &str) -> Option<serde_json::Value> {
    let request = parse_line(line).unwrap();
    dispatch(&app.state, request).await.unwrap()
}

async fn records_today(app: &TestApp) -> usize {
    app.state
        .queries
        .adherence
        .month_records(&user(), 2024, 6)
        .await
        .unwrap()
        .len()
}

async fn current_streak(app: &TestApp) -> u32 {
    app.state
        .queries
        .adherence
        .streak(&user())
        .await
        .unwrap()
        .current_streak
}

/// Wait until the bridge has stored `count` records for today
async fn wait_for_records(app: &TestApp, count: usize) -> bool {
    for _ in 0..250 {
        if records_today(app).await == count {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    false
}

/// Wait until the stored streak reaches `current`
async fn wait_for_streak(app: &TestApp, current: u32) -> bool {
    for _ in 0..250 {
        if current_streak(app).await == current {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    false
}

/// Wait until the pushed streak snapshot reaches `current`
async fn wait_for_snapshot(app: &TestApp, current: u32) -> bool {
    let mut rx = app.state.streak_updates();
    let reached = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        rx.wait_for(|s| s.as_ref().map(|s| s.current_streak) == Some(current)),
    )
    .await;
    matches!(reached, Ok(Ok(_)))
}

#[tokio::test]
async fn test_taken_on_first_notification_extends_streak() {
    let app = setup_app().await;
    seed_streak(&app, 5, today() - Duration::days(1)).await;

    let line = format!(
        r#"{{"action":"MARK_AS_TAKEN_ACTION","reminder_name":"Morning","reminder_id":"r-1",
            "reminder_time":{},"medication_id":"m-1","medication_name":"Aspirin"}}"#,
        millis_today(8, 0)
    );
    assert!(send(&app, &line).await.is_none());

    assert!(wait_for_snapshot(&app, 6).await);
    assert_eq!(current_streak(&app).await, 6);

    let records = app
        .state
        .queries
        .adherence
        .month_records(&user(), 2024, 6)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, "taken");
    assert_eq!(records[0].medication_id, "m-1");

    let snapshot = app.state.streak_updates().borrow().clone().unwrap();
    assert_eq!(snapshot.current_streak, 6);
    assert_eq!(snapshot.last_adherence_date.as_deref(), Some("2024-06-10"));

    app.state.shutdown().await;
}

#[tokio::test]
async fn test_snooze_then_taken_resets_streak() {
    let app = setup_app().await;
    seed_streak(&app, 5, today() - Duration::days(1)).await;

    let intent = |action: &str| {
        format!(
            r#"{{"action":"{}","reminder_name":"Morning","reminder_id":"r-1",
                "reminder_time":{},"medication_id":"m-1","medication_name":"Aspirin"}}"#,
            action,
            millis_today(8, 0)
        )
    };
    send(&app, &intent("SNOOZE_ACTION")).await;
    assert_eq!(app.state.services.reminder_actions.pending_snoozes().await, 1);
    send(&app, &intent("MARK_AS_TAKEN_ACTION")).await;
    assert_eq!(app.state.services.reminder_actions.pending_snoozes().await, 0);

    assert!(wait_for_records(&app, 2).await);
    // both writes land on 0, whichever commits last
    assert!(wait_for_streak(&app, 0).await);

    let streak = app.state.queries.adherence.streak(&user()).await.unwrap();
    assert_eq!(streak.longest_streak, 5);

    app.state.shutdown().await;
}

#[tokio::test]
async fn test_broadcast_line_records_through_bridge() {
    let app = setup_app().await;

    let line = format!(
        r#"{{"action":"MEDICATION_TAKEN_ACTION","reminder_id":"r-9","reminder_time":{},
            "status":"taken","medication_id":"m-2","medication_name":"Statin"}}"#,
        millis_today(7, 30)
    );
    send(&app, &line).await;

    // no prior streak: first good day starts at 1
    assert!(wait_for_snapshot(&app, 1).await);

    let calendar = send(&app, r#"{"action":"GET_CALENDAR","year":2024,"month":6}"#)
        .await
        .unwrap();
    assert_eq!(calendar["days"][9]["status"], "all_taken");
    assert_eq!(calendar["month_stats"]["fully_adherent_days"], 1);

    app.state.shutdown().await;
}

#[tokio::test]
async fn test_switching_user_rebuilds_daily_status() {
    let app = setup_app().await;

    send(
        &app,
        &format!(
            r#"{{"action":"SNOOZE_ACTION","reminder_name":"Morning","reminder_id":"r-1",
                "reminder_time":{},"medication_id":"m-1","medication_name":"Aspirin"}}"#,
            millis_today(8, 0)
        ),
    )
    .await;
    assert!(wait_for_records(&app, 1).await);

    // sign out and back in: today's snooze must be replayed from the store
    send(&app, r#"{"action":"SWITCH_USER"}"#).await;
    assert!(matches!(
        dispatch(&app.state, IpcRequest::Streak).await,
        Err(medisort_domain::shared::DomainError::Unauthenticated(_))
    ));
    send(&app, r#"{"action":"SWITCH_USER","user_id":"user-1"}"#).await;

    let status = app
        .state
        .repositories
        .daily_status
        .get(&user(), today())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.summary().tracked, 1);
    assert_eq!(status.summary().taken_on_first_try, 0);

    app.state.shutdown().await;
}

#[tokio::test]
async fn test_saved_reminder_is_scheduled_and_fires() {
    let mut app = setup_app().await;

    // 2024-06-10 is a Monday; clock is at 09:00
    let reply = send(
        &app,
        r#"{"action":"SAVE_REMINDER","name":"Mid-morning","time":"09:00","days":["Monday"],
            "medications":[{"id":"m-1","name":"Aspirin"}]}"#,
    )
    .await
    .unwrap();
    assert_eq!(reply["scheduled"], true);
    let reminder_id = reply["reminder_id"].as_str().unwrap().to_string();

    assert_eq!(app.state.services.scheduler.scheduled_count().await, 1);

    // fire intents go straight to the notifier
    send(
        &app,
        &format!(
            r#"{{"reminder_name":"Mid-morning","reminder_id":"{}","reminder_time":{},
                "medication_id":"m-1","medication_name":"Aspirin"}}"#,
            reminder_id,
            millis_today(9, 0)
        ),
    )
    .await;
    let fired = app.notified.recv().await.unwrap();
    assert_eq!(fired.reminder_id.as_str(), reminder_id);

    send(
        &app,
        &format!(r#"{{"action":"DELETE_REMINDER","reminder_id":"{}"}}"#, reminder_id),
    )
    .await;
    assert_eq!(app.state.services.scheduler.scheduled_count().await, 0);
    assert!(app.clock.today() == today());

    app.state.shutdown().await;
}

#[tokio::test]
async fn test_reminders_of_another_user_cannot_be_changed() {
    let app = setup_app().await;

    let reply = send(
        &app,
        r#"{"action":"SAVE_REMINDER","name":"Night","time":"21:00","days":["Monday"],
            "medications":[{"id":"m-1","name":"Statin"}]}"#,
    )
    .await
    .unwrap();
    let reminder_id = reply["reminder_id"].as_str().unwrap().to_string();

    send(&app, r#"{"action":"SWITCH_USER","user_id":"user-2"}"#).await;

    let delete = parse_line(&format!(
        r#"{{"action":"DELETE_REMINDER","reminder_id":"{}"}}"#,
        reminder_id
    ))
    .unwrap();
    assert!(matches!(
        dispatch(&app.state, delete).await,
        Err(DomainError::ReminderNotFound(_))
    ));

    let overwrite = parse_line(&format!(
        r#"{{"action":"SAVE_REMINDER","reminder_id":"{}","name":"Hijacked","time":"07:00",
            "days":["Friday"],"medications":[]}}"#,
        reminder_id
    ))
    .unwrap();
    assert!(matches!(
        dispatch(&app.state, overwrite).await,
        Err(DomainError::ReminderNotFound(_))
    ));

    let stored = app
        .state
        .repositories
        .reminder
        .find_by_id(&ReminderId::from_string(&reminder_id))
        .await
        .unwrap()
        .expect("reminder kept");
    assert_eq!(stored.user_id(), &user());
    assert_eq!(stored.name(), "Night");

    app.state.shutdown().await;
}
