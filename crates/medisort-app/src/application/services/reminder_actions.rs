use log::{error, info};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::application::services::{BroadcastSender, UserSession};
use medisort_domain::adherence::AdherenceStatus;
use medisort_domain::reminder::{ReminderAction, ReminderIntent, ReminderNotifier};
use medisort_domain::shared::{DomainError, ReminderId, UserId};

/// A scheduled re-fire, tagged so a finished task only clears its own entry
struct PendingSnooze {
    generation: u64,
    handle: JoinHandle<()>,
}

type PendingSnoozes = Arc<Mutex<HashMap<ReminderId, PendingSnooze>>>;

/// Drop the entry for `reminder_id` if it still belongs to `generation`.
/// Returns false when a newer snooze has replaced it.
async fn release_snooze(
    pending: &PendingSnoozes,
    reminder_id: &ReminderId,
    generation: u64,
) -> bool {
    let mut pending = pending.lock().await;
    match pending.get(reminder_id) {
        Some(entry) if entry.generation == generation => {
            pending.remove(reminder_id);
            true
        }
        _ => false,
    }
}

/// Turns notification actions into adherence broadcasts and owns the
/// pending snooze re-fires.
pub struct ReminderActionHandler {
    bridge: BroadcastSender,
    notifier: Arc<dyn ReminderNotifier>,
    session: Arc<UserSession>,
    snooze_delay: Duration,
    pending_snoozes: PendingSnoozes,
    next_generation: AtomicU64,
}

impl ReminderActionHandler {
    pub fn new(
        bridge: BroadcastSender,
        notifier: Arc<dyn ReminderNotifier>,
        session: Arc<UserSession>,
        snooze_delay: Duration,
    ) -> Self {
        Self {
            bridge,
            notifier,
            session,
            snooze_delay,
            pending_snoozes: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    pub async fn handle(&self, intent: ReminderIntent) -> Result<(), DomainError> {
        match intent.action() {
            ReminderAction::Fire => self.fire(&intent).await,
            ReminderAction::Snooze => {
                self.broadcast(&intent, AdherenceStatus::Snoozed)?;
                self.schedule_snooze(intent).await
            }
            ReminderAction::MarkTaken => {
                self.broadcast(&intent, AdherenceStatus::Taken)?;
                self.cancel_snooze(&intent.reminder_id()).await;
                Ok(())
            }
        }
    }

    pub async fn pending_snoozes(&self) -> usize {
        self.pending_snoozes.lock().await.len()
    }

    /// Drop every pending re-fire
    pub async fn cancel_all(&self) {
        let mut pending = self.pending_snoozes.lock().await;
        for (_, entry) in pending.drain() {
            entry.handle.abort();
        }
    }

    /// The intent's own user, else the signed-in one
    async fn resolve_user(&self, intent: &ReminderIntent) -> Result<UserId, DomainError> {
        match intent.user_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(UserId::from_string(id)),
            _ => self.session.require_user().await,
        }
    }

    async fn fire(&self, intent: &ReminderIntent) -> Result<(), DomainError> {
        let user = self.resolve_user(intent).await?;
        let occurrence = intent.to_occurrence(&user)?;
        self.notifier.notify(&occurrence).await
    }

    /// One broadcast per medication, in order
    fn broadcast(
        &self,
        intent: &ReminderIntent,
        status: AdherenceStatus,
    ) -> Result<(), DomainError> {
        for broadcast in intent.to_broadcasts(status)? {
            self.bridge.send(broadcast)?;
        }
        info!(
            "Reminder '{}' marked {} from notification",
            intent.reminder_name, status
        );
        Ok(())
    }

    async fn schedule_snooze(&self, intent: ReminderIntent) -> Result<(), DomainError> {
        let reminder_id = intent.reminder_id();
        let user = self.resolve_user(&intent).await?;
        let occurrence = intent.to_occurrence(&user)?;
        let notifier = Arc::clone(&self.notifier);
        let delay = self.snooze_delay;
        let id_for_task = reminder_id.clone();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        // Spawn and insert under the lock so the task cannot clear its entry
        // before it exists.
        let mut pending = self.pending_snoozes.lock().await;
        let pending_for_task = Arc::clone(&self.pending_snoozes);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !release_snooze(&pending_for_task, &id_for_task, generation).await {
                return;
            }
            if let Err(e) = notifier.notify(&occurrence).await {
                error!("Snoozed reminder {} failed to re-fire: {}", id_for_task, e);
            }
        });

        let entry = PendingSnooze { generation, handle };
        if let Some(old) = pending.insert(reminder_id.clone(), entry) {
            old.handle.abort();
        }
        drop(pending);
        info!(
            "Reminder {} snoozed for {} seconds",
            reminder_id,
            self.snooze_delay.as_secs()
        );
        Ok(())
    }

    async fn cancel_snooze(&self, reminder_id: &ReminderId) {
        if let Some(entry) = self.pending_snoozes.lock().await.remove(reminder_id) {
            entry.handle.abort();
            info!("Cancelled pending snooze for reminder {}", reminder_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use medisort_domain::adherence::AdherenceBroadcast;
    use medisort_domain::reminder::{ReminderOccurrence, MARK_AS_TAKEN_ACTION, SNOOZE_ACTION};
    use tokio::sync::mpsc;

    struct ChannelNotifier {
        tx: mpsc::UnboundedSender<ReminderOccurrence>,
    }

    #[async_trait]
    impl ReminderNotifier for ChannelNotifier {
        async fn notify(&self, occurrence: &ReminderOccurrence) -> Result<(), DomainError> {
            let _ = self.tx.send(occurrence.clone());
            Ok(())
        }
    }

    struct Fixture {
        handler: ReminderActionHandler,
        broadcasts: mpsc::Receiver<AdherenceBroadcast>,
        notified: mpsc::UnboundedReceiver<ReminderOccurrence>,
    }

    fn fixture() -> Fixture {
        let (bridge, broadcasts) = BroadcastSender::channel(16);
        let (tx, notified) = mpsc::unbounded_channel();
        let handler = ReminderActionHandler::new(
            bridge,
            Arc::new(ChannelNotifier { tx }),
            Arc::new(UserSession::new(Some(UserId::from_string("user-1")))),
            Duration::from_secs(60),
        );
        Fixture {
            handler,
            broadcasts,
            notified,
        }
    }

    fn intent(action: Option<&str>) -> ReminderIntent {
        let mut intent = ReminderIntent::decode(
            r#"{
                "reminder_name": "Breakfast",
                "reminder_time": 1717398000000,
                "reminder_id": "r-1",
                "medication_ids": ["m-1", "m-2"],
                "medication_names": ["Aspirin", "Statin"]
            }"#,
        )
        .unwrap();
        intent.action = action.map(str::to_string);
        intent
    }

    #[tokio::test(start_paused = true)]
    async fn test_snooze_broadcasts_each_medication_and_refires() {
        let mut f = fixture();

        f.handler.handle(intent(Some(SNOOZE_ACTION))).await.unwrap();

        let first = f.broadcasts.recv().await.unwrap();
        let second = f.broadcasts.recv().await.unwrap();
        assert_eq!((first.status.as_str(), first.medication_id.as_str()), ("snoozed", "m-1"));
        assert_eq!((second.status.as_str(), second.medication_id.as_str()), ("snoozed", "m-2"));
        assert_eq!(f.handler.pending_snoozes().await, 1);

        // paused clock auto-advances past the snooze delay
        let refired = f.notified.recv().await.unwrap();
        assert_eq!(refired.reminder_id.as_str(), "r-1");
        assert_eq!(refired.medications.len(), 2);
        assert_eq!(f.handler.pending_snoozes().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_taken_cancels_pending_snooze() {
        let mut f = fixture();

        f.handler.handle(intent(Some(SNOOZE_ACTION))).await.unwrap();
        f.handler.handle(intent(Some(MARK_AS_TAKEN_ACTION))).await.unwrap();
        assert_eq!(f.handler.pending_snoozes().await, 0);

        let statuses: Vec<String> = (0..4)
            .map(|_| f.broadcasts.try_recv().unwrap().status)
            .collect();
        assert_eq!(statuses, vec!["snoozed", "snoozed", "taken", "taken"]);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(f.notified.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resnooze_then_taken_cancels_latest_refire() {
        let mut f = fixture();

        f.handler.handle(intent(Some(SNOOZE_ACTION))).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        f.handler.handle(intent(Some(SNOOZE_ACTION))).await.unwrap();
        assert_eq!(f.handler.pending_snoozes().await, 1);

        // first snooze's deadline passes; it was replaced and must not clear the second
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(f.handler.pending_snoozes().await, 1);

        f.handler.handle(intent(Some(MARK_AS_TAKEN_ACTION))).await.unwrap();
        assert_eq!(f.handler.pending_snoozes().await, 0);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(f.notified.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_task_does_not_release_newer_snooze() {
        let pending: PendingSnoozes = Arc::new(Mutex::new(HashMap::new()));
        let id = ReminderId::from_string("r-1");
        let handle = tokio::spawn(std::future::pending::<()>());
        pending
            .lock()
            .await
            .insert(id.clone(), PendingSnooze { generation: 2, handle });

        assert!(!release_snooze(&pending, &id, 1).await);
        assert_eq!(pending.lock().await.len(), 1);

        assert!(release_snooze(&pending, &id, 2).await);
        assert!(pending.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_delay_snooze_leaves_no_stale_entry() {
        let (bridge, _broadcasts) = BroadcastSender::channel(16);
        let (tx, mut notified) = mpsc::unbounded_channel();
        let handler = ReminderActionHandler::new(
            bridge,
            Arc::new(ChannelNotifier { tx }),
            Arc::new(UserSession::new(Some(UserId::from_string("user-1")))),
            Duration::ZERO,
        );

        handler.handle(intent(Some(SNOOZE_ACTION))).await.unwrap();
        notified.recv().await.unwrap();
        assert_eq!(handler.pending_snoozes().await, 0);
    }

    #[tokio::test]
    async fn test_fire_notifies_without_broadcasting() {
        let mut f = fixture();

        f.handler.handle(intent(None)).await.unwrap();

        let occurrence = f.notified.recv().await.unwrap();
        assert_eq!(occurrence.user_id.as_str(), "user-1");
        assert!(f.broadcasts.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalid_time_is_rejected_before_broadcasting() {
        let mut f = fixture();
        let mut broken = intent(Some(MARK_AS_TAKEN_ACTION));
        broken.reminder_time = -1;

        let result = f.handler.handle(broken).await;
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(f.broadcasts.try_recv().is_err());
    }
}
