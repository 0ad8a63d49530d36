use super::types::ReminderTaskConfig;
use chrono::Utc;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use medisort_domain::reminder::Reminder;

impl super::ReminderScheduler {
    /// Start (or restart) the task for `reminder`. Inactive reminders are
    /// unscheduled instead. Returns whether a task is now running.
    pub async fn schedule(&self, reminder: Reminder) -> bool {
        if !reminder.is_active() {
            debug!("Reminder '{}' is inactive, not scheduling", reminder.name());
            self.unschedule(reminder.id()).await;
            return false;
        }

        let reminder_id = reminder.id().clone();
        self.spawn_reminder_task(ReminderTaskConfig {
            reminder,
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
        })
        .await;

        info!("Reminder {} scheduled", reminder_id);
        true
    }

    async fn spawn_reminder_task(&self, config: ReminderTaskConfig) {
        let ReminderTaskConfig {
            reminder,
            notifier,
            clock,
        } = config;

        let reminder_id = reminder.id().clone();

        let handle = tokio::spawn(async move {
            // Never fire the same occurrence twice, even if the clock lags
            let mut last_fired = None;

            loop {
                let now = clock.now();
                let cursor = match last_fired {
                    Some(fired) if fired > now => fired,
                    _ => now,
                };

                let next = match reminder.next_occurrence(cursor) {
                    Some(next) => next,
                    None => {
                        warn!(
                            "Reminder '{}' has no upcoming occurrence, task exits",
                            reminder.name()
                        );
                        break;
                    }
                };

                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                debug!(
                    "Next firing of '{}': {} (in {} seconds)",
                    reminder.name(),
                    next.format("%Y-%m-%d %H:%M %:z"),
                    wait.as_secs()
                );

                tokio::time::sleep(wait).await;

                let occurrence = reminder.occurrence_at(next.with_timezone(&Utc));
                info!(
                    "Reminder '{}' due for {} medication(s)",
                    reminder.name(),
                    occurrence.medications.len()
                );
                if let Err(e) = notifier.notify(&occurrence).await {
                    error!("Failed to deliver reminder '{}': {}", reminder.name(), e);
                }

                last_fired = Some(next);
            }
        });

        let mut tasks = self.tasks.lock().await;
        if let Some(old_handle) = tasks.insert(reminder_id.clone(), handle) {
            debug!("Replacing running task for reminder {}", reminder_id);
            old_handle.abort();
        }
    }
}
