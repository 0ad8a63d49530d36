use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, instrument};

use medisort_domain::reminder::ReminderRepository;
use medisort_domain::shared::{DomainError, ReminderId, UserId};

impl super::ReminderScheduler {
    /// Stop one reminder's task. Returns whether it was running.
    pub async fn unschedule(&self, reminder_id: &ReminderId) -> bool {
        match self.tasks.lock().await.remove(reminder_id) {
            Some(handle) => {
                handle.abort();
                info!("Reminder {} unscheduled", reminder_id);
                true
            }
            None => false,
        }
    }

    pub async fn unschedule_all(&self) {
        let mut tasks = self.tasks.lock().await;
        if tasks.is_empty() {
            return;
        }

        info!("Stopping {} reminder tasks", tasks.len());
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }

    pub async fn scheduled_count(&self) -> usize {
        self.tasks.lock().await.len()
    }

    pub async fn is_scheduled(&self, reminder_id: &ReminderId) -> bool {
        self.tasks.lock().await.contains_key(reminder_id)
    }

    /// Replace every task with the user's active reminders.
    #[instrument(skip(self, reminder_repo))]
    pub async fn reload_for_user(
        &self,
        reminder_repo: Arc<dyn ReminderRepository>,
        user_id: &UserId,
    ) -> Result<usize, DomainError> {
        self.unschedule_all().await;

        let reminders = reminder_repo.find_active_by_user(user_id).await?;
        let scheduled = join_all(reminders.into_iter().map(|r| self.schedule(r)))
            .await
            .into_iter()
            .filter(|scheduled| *scheduled)
            .count();

        info!("Scheduled {} reminders for user {}", scheduled, user_id);
        Ok(scheduled)
    }
}
