#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

use medisort_domain::reminder::{ReminderNotifier, ReminderOccurrence};
use medisort_domain::shared::{DomainError, FixedClock, UserId};
use medisort_lib::application::config::AppConfig;
use medisort_lib::presentation::bootstrap::build_app_state_with;
use medisort_lib::presentation::state::AppState;

pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<ReminderOccurrence>,
}

#[async_trait]
impl ReminderNotifier for ChannelNotifier {
    async fn notify(&self, occurrence: &ReminderOccurrence) -> Result<(), DomainError> {
        let _ = self.tx.send(occurrence.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<FixedClock>,
    pub notified: mpsc::UnboundedReceiver<ReminderOccurrence>,
    _dir: TempDir,
}

pub fn user() -> UserId {
    UserId::from_string("user-1")
}

/// "Today" in every app built here
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

pub fn millis_today(hour: u32, minute: u32) -> i64 {
    Utc.from_utc_datetime(&today().and_hms_opt(hour, minute, 0).unwrap())
        .timestamp_millis()
}

/// App on a temp database, clock pinned to 09:00 UTC today, user signed in
pub async fn setup_app() -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = AppConfig::default()
        .with_data_dir(dir.path().to_path_buf())
        .with_snooze_delay(Duration::from_secs(600));

    let clock = Arc::new(FixedClock::at_utc(today(), 9, 0));
    let (tx, notified) = mpsc::unbounded_channel();

    let state = build_app_state_with(&config, clock.clone(), Arc::new(ChannelNotifier { tx }))
        .await
        .expect("build app state");
    state
        .switch_user(Some(user()))
        .await
        .expect("switch user");

    TestApp {
        state,
        clock,
        notified,
        _dir: dir,
    }
}
