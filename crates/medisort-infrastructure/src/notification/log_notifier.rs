use async_trait::async_trait;
use tracing::info;

use medisort_domain::reminder::{ReminderNotifier, ReminderOccurrence};
use medisort_domain::shared::DomainError;

/// Notifier that writes due reminders to the log. Stands in for the
/// platform notification service when running headless.
#[derive(Debug, Clone, Default)]
pub struct LogReminderNotifier;

impl LogReminderNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReminderNotifier for LogReminderNotifier {
    async fn notify(&self, occurrence: &ReminderOccurrence) -> Result<(), DomainError> {
        let medications: Vec<&str> = occurrence
            .medications
            .iter()
            .map(|m| m.name.as_str())
            .collect();

        info!(
            target: "medisort::reminder",
            reminder_id = %occurrence.reminder_id,
            user_id = %occurrence.user_id,
            scheduled_for = %occurrence.scheduled_for.to_rfc3339(),
            medications = ?medications,
            "Time to take your medication: {}",
            occurrence.reminder_name
        );
        Ok(())
    }
}
