use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use medisort_domain::adherence::{AdherenceRecord, AdherenceRepository, AdherenceStatus};
use medisort_domain::shared::{AdherenceId, DomainError, MedicationId, ReminderId, UserId};

use crate::persistence::SqliteRepositoryBase;

const COLUMNS: &str =
    "id, reminder_id, medication_id, medication_name, user_id, status, scheduled_for, taken_at";

#[derive(FromRow)]
struct AdherenceRow {
    id: String,
    reminder_id: String,
    medication_id: String,
    medication_name: String,
    user_id: String,
    status: String,
    scheduled_for: DateTime<Utc>,
    taken_at: DateTime<Utc>,
}

impl AdherenceRow {
    fn into_record(self) -> Result<AdherenceRecord, DomainError> {
        let status: AdherenceStatus = self.status.parse().map_err(|_| {
            DomainError::DataIntegrity(format!(
                "Adherence record {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;

        Ok(AdherenceRecord::restore(
            AdherenceId::from_string(&self.id),
            ReminderId::from_string(&self.reminder_id),
            MedicationId::from_string(&self.medication_id),
            self.medication_name,
            UserId::from_string(&self.user_id),
            status,
            self.scheduled_for,
            self.taken_at,
        ))
    }
}

pub struct SqliteAdherenceRepository {
    base: SqliteRepositoryBase,
}

impl SqliteAdherenceRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }
}

#[async_trait]
impl AdherenceRepository for SqliteAdherenceRepository {
    async fn save(&self, record: &AdherenceRecord) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO adherence_records
                (id, reminder_id, medication_id, medication_name, user_id, status, scheduled_for, taken_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#;

        self.base
            .execute(
                sqlx::query(query)
                    .bind(record.id().as_str())
                    .bind(record.reminder_id().as_str())
                    .bind(record.medication_id().as_str())
                    .bind(record.medication_name())
                    .bind(record.user_id().as_str())
                    .bind(record.status().as_str())
                    .bind(record.scheduled_for())
                    .bind(record.taken_at()),
                "Save adherence record",
            )
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &AdherenceId) -> Result<Option<AdherenceRecord>, DomainError> {
        let query = format!("SELECT {} FROM adherence_records WHERE id = ?1", COLUMNS);

        let row: Option<AdherenceRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(&query).bind(id.as_str()),
                "Find adherence record by ID",
            )
            .await?;

        row.map(AdherenceRow::into_record).transpose()
    }

    async fn find_by_user_in_range(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AdherenceRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM adherence_records \
             WHERE user_id = ?1 AND taken_at >= ?2 AND taken_at < ?3 \
             ORDER BY taken_at ASC",
            COLUMNS
        );

        let rows: Vec<AdherenceRow> = self
            .base
            .fetch_all(
                sqlx::query_as(&query)
                    .bind(user_id.as_str())
                    .bind(start)
                    .bind(end),
                "Find adherence records in range",
            )
            .await?;

        rows.into_iter().map(AdherenceRow::into_record).collect()
    }
}
