use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AdherenceStatus;
use crate::shared::{DomainError, MedicationId, ReminderId};

/// Intent action carried by adherence broadcasts
pub const ADHERENCE_BROADCAST_ACTION: &str = "MEDICATION_TAKEN_ACTION";

fn default_status() -> String {
    AdherenceStatus::Taken.as_str().to_string()
}

/// Wire form of the local broadcast sent when a notification action resolves
/// a reminder. Keys match the broadcast-intent contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherenceBroadcast {
    pub reminder_id: String,
    /// Scheduled occurrence, epoch milliseconds
    #[serde(default)]
    pub reminder_time: i64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub medication_id: String,
    #[serde(default)]
    pub medication_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_name: Option<String>,
}

/// Validated content of an [`AdherenceBroadcast`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdherenceReport {
    pub reminder_id: ReminderId,
    pub medication_id: MedicationId,
    pub medication_name: String,
    pub status: AdherenceStatus,
    pub scheduled_for: DateTime<Utc>,
}

impl AdherenceBroadcast {
    pub fn new(
        reminder_id: &ReminderId,
        reminder_time: i64,
        status: AdherenceStatus,
        medication_id: &MedicationId,
        medication_name: impl Into<String>,
    ) -> Self {
        Self {
            reminder_id: reminder_id.as_str().to_string(),
            reminder_time,
            status: status.as_str().to_string(),
            medication_id: medication_id.as_str().to_string(),
            medication_name: medication_name.into(),
            reminder_name: None,
        }
    }

    pub fn with_reminder_name(mut self, name: impl Into<String>) -> Self {
        self.reminder_name = Some(name.into());
        self
    }

    pub fn decode(payload: &str) -> Result<Self, DomainError> {
        serde_json::from_str(payload)
            .map_err(|e| DomainError::Serialization(format!("Invalid adherence broadcast: {}", e)))
    }

    pub fn encode(&self) -> Result<String, DomainError> {
        serde_json::to_string(self).map_err(|e| DomainError::Serialization(e.to_string()))
    }

    pub fn into_report(self) -> Result<AdherenceReport, DomainError> {
        if self.reminder_id.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Broadcast is missing reminder_id".to_string(),
            ));
        }

        let status: AdherenceStatus = self.status.parse()?;
        let scheduled_for = DateTime::<Utc>::from_timestamp_millis(self.reminder_time)
            .ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "reminder_time out of range: {}",
                    self.reminder_time
                ))
            })?;

        Ok(AdherenceReport {
            reminder_id: ReminderId::from_string(&self.reminder_id),
            medication_id: MedicationId::from_string(&self.medication_id),
            medication_name: self.medication_name,
            status,
            scheduled_for,
        })
    }
}
