use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::{AdherenceId, DomainError, MedicationId, ReminderId, UserId};

/// Outcome of one reminder occurrence as reported by the notification actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdherenceStatus {
    Taken,
    Missed,
    Snoozed,
}

impl AdherenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdherenceStatus::Taken => "taken",
            AdherenceStatus::Missed => "missed",
            AdherenceStatus::Snoozed => "snoozed",
        }
    }
}

impl fmt::Display for AdherenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdherenceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "taken" => Ok(AdherenceStatus::Taken),
            "missed" => Ok(AdherenceStatus::Missed),
            "snoozed" => Ok(AdherenceStatus::Snoozed),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown adherence status: {}",
                other
            ))),
        }
    }
}

/// Immutable log entry written whenever a reminder notification is resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdherenceRecord {
    id: AdherenceId,
    reminder_id: ReminderId,
    medication_id: MedicationId,
    medication_name: String,
    user_id: UserId,
    status: AdherenceStatus,
    scheduled_for: DateTime<Utc>,
    taken_at: DateTime<Utc>,
}

impl AdherenceRecord {
    pub fn new(
        reminder_id: ReminderId,
        medication_id: MedicationId,
        medication_name: String,
        user_id: UserId,
        status: AdherenceStatus,
        scheduled_for: DateTime<Utc>,
        taken_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if reminder_id.is_empty() {
            return Err(DomainError::Validation(
                "Adherence record requires a reminder id".to_string(),
            ));
        }
        if user_id.is_empty() {
            return Err(DomainError::Validation(
                "Adherence record requires a user id".to_string(),
            ));
        }

        Ok(Self {
            id: AdherenceId::new(),
            reminder_id,
            medication_id,
            medication_name,
            user_id,
            status,
            scheduled_for,
            taken_at,
        })
    }

    /// Reconstruct from persistence
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: AdherenceId,
        reminder_id: ReminderId,
        medication_id: MedicationId,
        medication_name: String,
        user_id: UserId,
        status: AdherenceStatus,
        scheduled_for: DateTime<Utc>,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            reminder_id,
            medication_id,
            medication_name,
            user_id,
            status,
            scheduled_for,
            taken_at,
        }
    }

    pub fn id(&self) -> &AdherenceId {
        &self.id
    }

    pub fn reminder_id(&self) -> &ReminderId {
        &self.reminder_id
    }

    pub fn medication_id(&self) -> &MedicationId {
        &self.medication_id
    }

    pub fn medication_name(&self) -> &str {
        &self.medication_name
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn status(&self) -> AdherenceStatus {
        self.status
    }

    pub fn scheduled_for(&self) -> DateTime<Utc> {
        self.scheduled_for
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("Taken".parse::<AdherenceStatus>().unwrap(), AdherenceStatus::Taken);
        assert_eq!(" snoozed ".parse::<AdherenceStatus>().unwrap(), AdherenceStatus::Snoozed);
        assert!("late".parse::<AdherenceStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AdherenceStatus::Missed).unwrap();
        assert_eq!(json, "\"missed\"");
    }

    #[test]
    fn test_record_requires_reminder_and_user() {
        let now = Utc::now();
        let missing_reminder = AdherenceRecord::new(
            ReminderId::from_string(""),
            MedicationId::new(),
            "Aspirin".to_string(),
            UserId::new(),
            AdherenceStatus::Taken,
            now,
            now,
        );
        assert!(matches!(missing_reminder, Err(DomainError::Validation(_))));

        let missing_user = AdherenceRecord::new(
            ReminderId::new(),
            MedicationId::new(),
            "Aspirin".to_string(),
            UserId::from_string(""),
            AdherenceStatus::Taken,
            now,
            now,
        );
        assert!(matches!(missing_user, Err(DomainError::Validation(_))));
    }
}
