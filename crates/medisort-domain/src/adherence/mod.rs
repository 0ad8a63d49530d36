mod broadcast;
mod calendar;
mod daily_status;
mod record;
mod repository;

#[cfg(test)]
mod daily_status_test;

pub use broadcast::{AdherenceBroadcast, AdherenceReport, ADHERENCE_BROADCAST_ACTION};
pub use calendar::{DayAdherence, DayStatus};
pub use daily_status::{DailyReminderStatus, DailyStatusStore, DayOutcome, DaySummary};
pub use record::{AdherenceRecord, AdherenceStatus};
pub use repository::AdherenceRepository;
