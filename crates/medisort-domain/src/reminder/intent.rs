use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MedicationRef, ReminderOccurrence};
use crate::adherence::{AdherenceBroadcast, AdherenceStatus};
use crate::shared::{DomainError, MedicationId, ReminderId, UserId};

pub const SNOOZE_ACTION: &str = "SNOOZE_ACTION";
pub const MARK_AS_TAKEN_ACTION: &str = "MARK_AS_TAKEN_ACTION";

/// What the user (or the alarm) did with a reminder notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    Fire,
    Snooze,
    MarkTaken,
}

impl ReminderAction {
    pub fn from_action(action: Option<&str>) -> Self {
        match action {
            Some(SNOOZE_ACTION) => ReminderAction::Snooze,
            Some(MARK_AS_TAKEN_ACTION) => ReminderAction::MarkTaken,
            _ => ReminderAction::Fire,
        }
    }

    pub fn as_action(&self) -> Option<&'static str> {
        match self {
            ReminderAction::Fire => None,
            ReminderAction::Snooze => Some(SNOOZE_ACTION),
            ReminderAction::MarkTaken => Some(MARK_AS_TAKEN_ACTION),
        }
    }
}

fn default_reminder_name() -> String {
    "Medication Reminder".to_string()
}

fn invalid_time() -> i64 {
    -1
}

/// Payload attached to a reminder notification and its action buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default = "default_reminder_name")]
    pub reminder_name: String,
    /// Epoch milliseconds; `-1` marks a broken intent
    #[serde(default = "invalid_time")]
    pub reminder_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub medication_id: String,
    #[serde(default)]
    pub medication_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medication_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medication_names: Vec<String>,
}

impl ReminderIntent {
    /// Intent for a scheduled occurrence, using the multi-medication form
    /// when the reminder carries more than one medication.
    pub fn for_occurrence(occurrence: &ReminderOccurrence, action: ReminderAction) -> Self {
        let (medication_id, medication_name, medication_ids, medication_names) =
            match occurrence.medications.as_slice() {
                [] => (String::new(), String::new(), Vec::new(), Vec::new()),
                [single] => (
                    single.id.as_str().to_string(),
                    single.name.clone(),
                    Vec::new(),
                    Vec::new(),
                ),
                many => (
                    String::new(),
                    String::new(),
                    many.iter().map(|m| m.id.as_str().to_string()).collect(),
                    many.iter().map(|m| m.name.clone()).collect(),
                ),
            };

        Self {
            action: action.as_action().map(str::to_string),
            reminder_name: occurrence.reminder_name.clone(),
            reminder_time: occurrence.scheduled_for.timestamp_millis(),
            reminder_id: Some(occurrence.reminder_id.as_str().to_string()),
            user_id: Some(occurrence.user_id.as_str().to_string()),
            medication_id,
            medication_name,
            medication_ids,
            medication_names,
        }
    }

    pub fn decode(payload: &str) -> Result<Self, DomainError> {
        serde_json::from_str(payload)
            .map_err(|e| DomainError::Serialization(format!("Invalid reminder intent: {}", e)))
    }

    pub fn action(&self) -> ReminderAction {
        ReminderAction::from_action(self.action.as_deref())
    }

    /// Explicit id, or one derived from the reminder name when the intent
    /// predates ids.
    pub fn reminder_id(&self) -> ReminderId {
        match self.reminder_id.as_deref() {
            Some(id) if !id.trim().is_empty() => ReminderId::from_string(id),
            _ => ReminderId::from_string(&format!("name:{}", self.reminder_name)),
        }
    }

    pub fn scheduled_for(&self) -> Result<DateTime<Utc>, DomainError> {
        if self.reminder_time == -1 {
            return Err(DomainError::InvalidInput(format!(
                "Reminder '{}' has no reminder_time",
                self.reminder_name
            )));
        }
        DateTime::<Utc>::from_timestamp_millis(self.reminder_time).ok_or_else(|| {
            DomainError::InvalidInput(format!("reminder_time out of range: {}", self.reminder_time))
        })
    }

    pub fn is_multi_medication(&self) -> bool {
        !self.medication_ids.is_empty() && self.medication_ids.len() == self.medication_names.len()
    }

    /// Medications the intent refers to. A single-medication intent always
    /// yields exactly one entry, possibly with empty id and name.
    pub fn medications(&self) -> Vec<MedicationRef> {
        if self.is_multi_medication() {
            self.medication_ids
                .iter()
                .zip(self.medication_names.iter())
                .map(|(id, name)| MedicationRef::new(MedicationId::from_string(id), name.clone()))
                .collect()
        } else {
            vec![MedicationRef::new(
                MedicationId::from_string(&self.medication_id),
                self.medication_name.clone(),
            )]
        }
    }

    pub fn to_occurrence(&self, fallback_user: &UserId) -> Result<ReminderOccurrence, DomainError> {
        let user_id = match self.user_id.as_deref() {
            Some(id) if !id.is_empty() => UserId::from_string(id),
            _ => fallback_user.clone(),
        };

        Ok(ReminderOccurrence {
            reminder_id: self.reminder_id(),
            reminder_name: self.reminder_name.clone(),
            user_id,
            scheduled_for: self.scheduled_for()?,
            medications: self.medications(),
        })
    }

    /// One adherence broadcast per medication
    pub fn to_broadcasts(&self, status: AdherenceStatus) -> Result<Vec<AdherenceBroadcast>, DomainError> {
        self.scheduled_for()?;
        let reminder_id = self.reminder_id();

        Ok(self
            .medications()
            .into_iter()
            .map(|m| {
                AdherenceBroadcast::new(&reminder_id, self.reminder_time, status, &m.id, m.name)
                    .with_reminder_name(self.reminder_name.clone())
            })
            .collect())
    }
}
