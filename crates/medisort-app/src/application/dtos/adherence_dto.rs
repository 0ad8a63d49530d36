use serde::{Deserialize, Serialize};

use medisort_domain::adherence::{AdherenceRecord, DayAdherence, DayStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdherenceRecordDto {
    pub id: String,
    pub reminder_id: String,
    pub medication_id: String,
    pub medication_name: String,
    pub status: String,
    pub scheduled_for: String, // RFC 3339
    pub taken_at: String,      // RFC 3339
}

impl From<&AdherenceRecord> for AdherenceRecordDto {
    fn from(record: &AdherenceRecord) -> Self {
        Self {
            id: record.id().to_string(),
            reminder_id: record.reminder_id().to_string(),
            medication_id: record.medication_id().to_string(),
            medication_name: record.medication_name().to_string(),
            status: record.status().as_str().to_string(),
            scheduled_for: record.scheduled_for().to_rfc3339(),
            taken_at: record.taken_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDayDto {
    pub date: String, // YYYY-MM-DD
    pub total: usize,
    pub taken: usize,
    pub status: DayStatus,
}

impl From<DayAdherence> for CalendarDayDto {
    fn from(day: DayAdherence) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            total: day.total,
            taken: day.taken,
            status: day.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdherenceCalendarDto {
    pub user_id: String,
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDayDto>,
    pub month_stats: MonthStatsDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthStatsDto {
    pub days_with_reminders: u32,
    pub fully_adherent_days: u32,
    pub adherence_rate: f64, // percent (0.0 - 100.0)
}
