use async_trait::async_trait;
use chrono::{DateTime, Utc, Weekday};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use medisort_domain::reminder::{
    parse_weekday, weekday_name, MedicationRef, Reminder, ReminderRepository, ReminderTime,
};
use medisort_domain::shared::{DomainError, ReminderId, UserId};

use crate::persistence::SqliteRepositoryBase;

const COLUMNS: &str = "id, user_id, name, time, days, medications, taking_medication, created_at";

#[derive(FromRow)]
struct ReminderRow {
    id: String,
    user_id: String,
    name: String,
    time: String,
    days: String,
    medications: String,
    taking_medication: bool,
    created_at: DateTime<Utc>,
}

impl ReminderRow {
    fn into_reminder(self) -> Result<Reminder, DomainError> {
        let corrupt = |what: &str, e: &dyn std::fmt::Display| {
            DomainError::DataIntegrity(format!("Reminder {} has invalid {}: {}", self.id, what, e))
        };

        let time: ReminderTime = self.time.parse().map_err(|e| corrupt("time", &e))?;
        let day_names: Vec<String> =
            serde_json::from_str(&self.days).map_err(|e| corrupt("days", &e))?;
        let days = day_names
            .iter()
            .map(|d| parse_weekday(d))
            .collect::<Result<Vec<Weekday>, _>>()
            .map_err(|e| corrupt("days", &e))?;
        let medications: Vec<MedicationRef> =
            serde_json::from_str(&self.medications).map_err(|e| corrupt("medications", &e))?;

        Ok(Reminder::restore(
            ReminderId::from_string(&self.id),
            UserId::from_string(&self.user_id),
            self.name,
            time,
            days,
            medications,
            self.taking_medication,
            self.created_at,
        ))
    }
}

pub struct SqliteReminderRepository {
    base: SqliteRepositoryBase,
}

impl SqliteReminderRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl ReminderRepository for SqliteReminderRepository {
    async fn save(&self, reminder: &Reminder) -> Result<(), DomainError> {
        let days: Vec<&str> = reminder.days().iter().map(|d| weekday_name(*d)).collect();
        let days = serde_json::to_string(&days)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;
        let medications = serde_json::to_string(reminder.medications())
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        let query = r#"
            INSERT INTO reminders (id, user_id, name, time, days, medications, taking_medication, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = ?3,
                time = ?4,
                days = ?5,
                medications = ?6,
                taking_medication = ?7
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(reminder.id().as_str())
                    .bind(reminder.user_id().as_str())
                    .bind(reminder.name())
                    .bind(reminder.time().to_string())
                    .bind(days)
                    .bind(medications)
                    .bind(reminder.is_taking_medication())
                    .bind(reminder.created_at()),
                "Save reminder",
            )
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ReminderId) -> Result<Option<Reminder>, DomainError> {
        let query = format!("SELECT {} FROM reminders WHERE id = ?1", COLUMNS);

        let row: Option<ReminderRow> = self
            .base
            .fetch_optional(sqlx::query_as(&query).bind(id.as_str()), "Find reminder by ID")
            .await?;

        row.map(ReminderRow::into_reminder).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Reminder>, DomainError> {
        let query = format!(
            "SELECT {} FROM reminders WHERE user_id = ?1 ORDER BY time ASC, created_at ASC",
            COLUMNS
        );

        let rows: Vec<ReminderRow> = self
            .base
            .fetch_all(
                sqlx::query_as(&query).bind(user_id.as_str()),
                "Find reminders by user",
            )
            .await?;

        rows.into_iter().map(ReminderRow::into_reminder).collect()
    }

    async fn find_active_by_user(&self, user_id: &UserId) -> Result<Vec<Reminder>, DomainError> {
        let reminders = self.find_by_user(user_id).await?;
        Ok(reminders.into_iter().filter(Reminder::is_active).collect())
    }

    async fn delete(&self, id: &ReminderId) -> Result<(), DomainError> {
        let affected = self
            .base
            .execute(
                sqlx::query("DELETE FROM reminders WHERE id = ?1").bind(id.as_str()),
                "Delete reminder",
            )
            .await?;

        if affected == 0 {
            return Err(DomainError::ReminderNotFound(id.to_string()));
        }
        Ok(())
    }
}
