use async_trait::async_trait;
use log::debug;
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::dtos::StreakDto;
use crate::application::services::UserSession;
use medisort_domain::events::adherence_events::StreakUpdated;
use medisort_domain::events::event_bus::EventHandler;
use medisort_domain::shared::DomainError;

/// Keeps the latest streak of the signed-in user in a watch channel, so
/// observers are pushed every change instead of polling the store.
#[derive(Clone)]
pub struct StreakSnapshotHandler {
    session: Arc<UserSession>,
    tx: Arc<watch::Sender<Option<StreakDto>>>,
}

impl StreakSnapshotHandler {
    pub fn new(session: Arc<UserSession>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            session,
            tx: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<StreakDto>> {
        self.tx.subscribe()
    }

    /// Seed or reset the snapshot, e.g. after a user switch
    pub fn reset(&self, snapshot: Option<StreakDto>) {
        self.tx.send_replace(snapshot);
    }
}

#[async_trait]
impl EventHandler<StreakUpdated> for StreakSnapshotHandler {
    async fn handle(&self, event: &StreakUpdated) -> Result<(), DomainError> {
        if self.session.current().await.as_ref() != Some(&event.user_id) {
            debug!("Ignoring streak update for inactive user {}", event.user_id);
            return Ok(());
        }

        self.tx.send_replace(Some(StreakDto {
            user_id: event.user_id.to_string(),
            current_streak: event.current_streak,
            longest_streak: event.longest_streak,
            last_adherence_date: Some(event.last_adherence_date.format("%Y-%m-%d").to_string()),
            streak_start_date: event
                .streak_start_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
        }));
        Ok(())
    }
}
