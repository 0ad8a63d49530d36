use chrono::{DateTime, NaiveDate, Utc};

use medisort_domain::adherence::{AdherenceReport, AdherenceStatus, DaySummary};
use medisort_domain::shared::{AdherenceId, MedicationId, ReminderId, UserId};
use medisort_domain::streak::{StreakTransition, UserStreak};

/// Record the outcome of one reminder occurrence for the active user
#[derive(Debug, Clone)]
pub struct RecordAdherenceCommand {
    pub reminder_id: ReminderId,
    pub medication_id: MedicationId,
    pub medication_name: String,
    pub status: AdherenceStatus,
    pub scheduled_for: DateTime<Utc>,
}

impl From<AdherenceReport> for RecordAdherenceCommand {
    fn from(report: AdherenceReport) -> Self {
        Self {
            reminder_id: report.reminder_id,
            medication_id: report.medication_id,
            medication_name: report.medication_name,
            status: report.status,
            scheduled_for: report.scheduled_for,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordAdherenceResult {
    pub adherence_id: AdherenceId,
    pub user_id: UserId,
    pub day: NaiveDate,
    pub summary: DaySummary,
    pub streak: UserStreak,
    pub transition: StreakTransition,
}

/// Advance (or reset) a user's streak for `today`
#[derive(Debug, Clone)]
pub struct UpdateStreakCommand {
    pub user_id: UserId,
    pub all_on_time: bool,
    pub today: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct UpdateStreakResult {
    pub streak: UserStreak,
    pub transition: StreakTransition,
}
