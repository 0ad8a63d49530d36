use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{AdherenceRecord, AdherenceStatus};

/// Colour bucket of a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Upcoming,
    NoReminders,
    Missed,
    Partial,
    AllTaken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAdherence {
    pub date: NaiveDate,
    pub total: usize,
    pub taken: usize,
    pub status: DayStatus,
}

impl DayAdherence {
    /// Classify the records of one local day.
    ///
    /// `total` counts distinct medications, falling back to distinct
    /// reminders when no record carries a medication id.
    pub fn classify<'a>(
        date: NaiveDate,
        today: NaiveDate,
        records: impl IntoIterator<Item = &'a AdherenceRecord>,
    ) -> Self {
        let records: Vec<&AdherenceRecord> = records.into_iter().collect();

        let medication_ids: HashSet<&str> = records
            .iter()
            .map(|r| r.medication_id().as_str())
            .filter(|id| !id.is_empty())
            .collect();
        let total = if medication_ids.is_empty() {
            records
                .iter()
                .map(|r| r.reminder_id().as_str())
                .collect::<HashSet<_>>()
                .len()
        } else {
            medication_ids.len()
        };

        let taken = records
            .iter()
            .filter(|r| r.status() == AdherenceStatus::Taken)
            .count();

        let status = if date > today {
            DayStatus::Upcoming
        } else if total == 0 {
            DayStatus::NoReminders
        } else if taken == 0 {
            DayStatus::Missed
        } else if taken < total {
            DayStatus::Partial
        } else {
            DayStatus::AllTaken
        };

        Self {
            date,
            total,
            taken,
            status,
        }
    }
}
