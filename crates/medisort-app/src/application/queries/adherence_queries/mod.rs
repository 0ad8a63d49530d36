use log::info;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::dtos::{
    AdherenceCalendarDto, AdherenceRecordDto, CalendarDayDto, MonthStatsDto, StreakDto,
};
use medisort_domain::adherence::{AdherenceRecord, AdherenceRepository, DayAdherence, DayStatus};
use medisort_domain::shared::{local_day, Clock, DomainError, UserId};
use medisort_domain::streak::{StreakRepository, UserStreak};

mod helpers;


/// Read side of adherence history and streaks
pub struct AdherenceQueries {
    adherence_repo: Arc<dyn AdherenceRepository>,
    streak_repo: Arc<dyn StreakRepository>,
    clock: Arc<dyn Clock>,
}

impl AdherenceQueries {
    pub fn new(
        adherence_repo: Arc<dyn AdherenceRepository>,
        streak_repo: Arc<dyn StreakRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            adherence_repo,
            streak_repo,
            clock,
        }
    }

    /// Records with `taken_at` in the local month, oldest first
    pub async fn month_records(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<AdherenceRecordDto>, DomainError> {
        let records = self.fetch_month(user_id, year, month).await?;
        Ok(records.iter().map(AdherenceRecordDto::from).collect())
    }

    pub async fn calendar(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<AdherenceCalendarDto, DomainError> {
        let (first_day, last_day) = helpers::month_days(year, month)?;
        let records = self.fetch_month(user_id, year, month).await?;

        let offset = self.clock.offset();
        let today = self.clock.today();

        let mut by_day: HashMap<_, Vec<&AdherenceRecord>> = HashMap::new();
        for record in &records {
            by_day
                .entry(local_day(record.taken_at(), offset))
                .or_default()
                .push(record);
        }

        let mut days = Vec::new();
        let mut days_with_reminders = 0u32;
        let mut fully_adherent_days = 0u32;

        for date in helpers::days_of(first_day, last_day) {
            let day_records = by_day.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            let day = DayAdherence::classify(date, today, day_records.iter().copied());

            match day.status {
                DayStatus::AllTaken => {
                    days_with_reminders += 1;
                    fully_adherent_days += 1;
                }
                DayStatus::Missed | DayStatus::Partial => days_with_reminders += 1,
                DayStatus::Upcoming | DayStatus::NoReminders => {}
            }

            days.push(CalendarDayDto::from(day));
        }

        let adherence_rate = if days_with_reminders > 0 {
            f64::from(fully_adherent_days) / f64::from(days_with_reminders) * 100.0
        } else {
            0.0
        };

        info!(
            "Calendar {:04}-{:02} for user {}: {} records, {}/{} adherent days",
            year,
            month,
            user_id,
            records.len(),
            fully_adherent_days,
            days_with_reminders
        );

        Ok(AdherenceCalendarDto {
            user_id: user_id.to_string(),
            year,
            month,
            days,
            month_stats: MonthStatsDto {
                days_with_reminders,
                fully_adherent_days,
                adherence_rate,
            },
        })
    }

    /// Stored streak, or zero for a user who never had one
    pub async fn streak(&self, user_id: &UserId) -> Result<StreakDto, DomainError> {
        let streak = self
            .streak_repo
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| UserStreak::new(user_id.clone()));
        Ok(StreakDto::from(&streak))
    }

    async fn fetch_month(
        &self,
        user_id: &UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<AdherenceRecord>, DomainError> {
        let (start, end) = helpers::month_bounds(year, month, self.clock.offset())?;
        self.adherence_repo
            .find_by_user_in_range(user_id, start, end)
            .await
    }
}
