use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use medisort_domain::adherence::{
    AdherenceStatus, DailyReminderStatus, DailyStatusStore, DaySummary,
};
use medisort_domain::shared::{DomainError, ReminderId, UserId};

type DayKey = (UserId, NaiveDate);

/// Process-local daily status, keyed by (user, local day). Applying a
/// status for a day drops every older day.
#[derive(Clone, Default)]
pub struct InMemoryDailyStatusStore {
    days: Arc<RwLock<HashMap<DayKey, DailyReminderStatus>>>,
}

impl InMemoryDailyStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.days.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.days.read().await.is_empty()
    }
}

#[async_trait]
impl DailyStatusStore for InMemoryDailyStatusStore {
    async fn apply(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        reminder_id: &ReminderId,
        status: AdherenceStatus,
    ) -> Result<DaySummary, DomainError> {
        let mut days = self.days.write().await;
        days.retain(|(_, d), _| *d >= day);

        let entry = days.entry((user_id.clone(), day)).or_default();
        entry.apply(reminder_id, status);
        Ok(entry.summary())
    }

    async fn get(
        &self,
        user_id: &UserId,
        day: NaiveDate,
    ) -> Result<Option<DailyReminderStatus>, DomainError> {
        let days = self.days.read().await;
        Ok(days.get(&(user_id.clone(), day)).cloned())
    }

    async fn replace(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        status: DailyReminderStatus,
    ) -> Result<(), DomainError> {
        let mut days = self.days.write().await;
        days.insert((user_id.clone(), day), status);
        Ok(())
    }

    async fn clear_user(&self, user_id: &UserId) -> Result<(), DomainError> {
        let mut days = self.days.write().await;
        days.retain(|(user, _), _| user != user_id);
        Ok(())
    }

    async fn evict_before(&self, day: NaiveDate) -> Result<usize, DomainError> {
        let mut days = self.days.write().await;
        let before = days.len();
        days.retain(|(_, d), _| *d >= day);
        let evicted = before - days.len();
        if evicted > 0 {
            log::debug!("Evicted {} daily status entries before {}", evicted, day);
        }
        Ok(evicted)
    }
}
