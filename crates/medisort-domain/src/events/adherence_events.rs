use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::adherence::AdherenceStatus;
use crate::events::DomainEvent;
use crate::shared::{AdherenceId, MedicationId, ReminderId, UserId};
use crate::streak::StreakTransition;

/// Macro to implement DomainEvent trait with type name
macro_rules! impl_domain_event {
    ($type:ty) => {
        impl DomainEvent for $type {
            fn as_any(&self) -> &(dyn Any + Send + Sync) {
                self
            }

            fn event_type_name(&self) -> &'static str {
                std::any::type_name::<Self>()
            }
        }
    };
}

/// Fired after an adherence record is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdherenceRecorded {
    pub adherence_id: AdherenceId,
    pub user_id: UserId,
    pub reminder_id: ReminderId,
    pub medication_id: MedicationId,
    pub status: AdherenceStatus,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(AdherenceRecorded);

/// Fired after the user's streak row is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakUpdated {
    pub user_id: UserId,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_adherence_date: NaiveDate,
    pub streak_start_date: Option<NaiveDate>,
    pub transition: StreakTransition,
    pub occurred_at: DateTime<Utc>,
}

impl_domain_event!(StreakUpdated);
