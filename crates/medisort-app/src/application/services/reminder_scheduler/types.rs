use medisort_domain::reminder::{Reminder, ReminderNotifier};
use medisort_domain::shared::Clock;
use std::sync::Arc;

/// Everything a reminder task needs to run on its own
pub(super) struct ReminderTaskConfig {
    pub reminder: Reminder,
    pub notifier: Arc<dyn ReminderNotifier>,
    pub clock: Arc<dyn Clock>,
}
