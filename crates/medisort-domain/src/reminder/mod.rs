mod aggregate;
mod intent;
mod notifier;
mod repository;


pub use aggregate::{
    parse_weekday, weekday_name, MedicationRef, Reminder, ReminderOccurrence, ReminderTime,
};
pub use intent::{ReminderAction, ReminderIntent, MARK_AS_TAKEN_ACTION, SNOOZE_ACTION};
pub use notifier::ReminderNotifier;
pub use repository::ReminderRepository;
