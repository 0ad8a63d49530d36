mod task_manager;
mod task_spawner;

mod types;

use medisort_domain::reminder::ReminderNotifier;
use medisort_domain::shared::{Clock, ReminderId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Fires reminders at their weekly times, one tokio task per reminder.
pub struct ReminderScheduler {
    /// Running tasks keyed by reminder; replacing an entry aborts the old task
    tasks: Arc<Mutex<HashMap<ReminderId, JoinHandle<()>>>>,
    notifier: Arc<dyn ReminderNotifier>,
    clock: Arc<dyn Clock>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn ReminderNotifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            notifier,
            clock,
        }
    }
}
