use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{AdherenceRecord, AdherenceStatus};
use crate::shared::{DomainError, ReminderId, UserId};

/// Per-day bookkeeping of which reminders were taken on their first
/// notification.
///
/// A reminder enters the map the first time it is resolved that day. `true`
/// means it was taken without being snoozed first; once a reminder is marked
/// `false` (snoozed or missed) nothing later that day turns it back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyReminderStatus {
    first_try: HashMap<ReminderId, bool>,
    snoozed: HashSet<ReminderId>,
}

/// Aggregate view of one day used to feed the streak decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub tracked: usize,
    pub taken_on_first_try: usize,
}

impl DaySummary {
    /// All tracked reminders were taken on first notification. A day with
    /// nothing tracked never qualifies.
    pub fn all_on_time(&self) -> bool {
        self.tracked > 0 && self.taken_on_first_try == self.tracked
    }

    pub fn outcome(&self) -> DayOutcome {
        if self.tracked == 0 {
            DayOutcome::Pending
        } else if self.all_on_time() {
            DayOutcome::AllOnTime
        } else {
            DayOutcome::NotAllOnTime
        }
    }
}

/// Where a day stands before it is folded into the streak counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayOutcome {
    Pending,
    AllOnTime,
    NotAllOnTime,
}

impl DailyReminderStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, reminder_id: &ReminderId, status: AdherenceStatus) {
        match status {
            AdherenceStatus::Snoozed => {
                self.first_try.insert(reminder_id.clone(), false);
                self.snoozed.insert(reminder_id.clone());
            }
            AdherenceStatus::Missed => {
                self.first_try.insert(reminder_id.clone(), false);
            }
            AdherenceStatus::Taken => {
                if !self.first_try.contains_key(reminder_id) && !self.snoozed.contains(reminder_id)
                {
                    self.first_try.insert(reminder_id.clone(), true);
                }
            }
        }
    }

    /// Replay records in `taken_at` order
    pub fn replay<'a>(records: impl IntoIterator<Item = &'a AdherenceRecord>) -> Self {
        let mut ordered: Vec<&AdherenceRecord> = records.into_iter().collect();
        ordered.sort_by_key(|r| r.taken_at());

        let mut status = Self::new();
        for record in ordered {
            status.apply(record.reminder_id(), record.status());
        }
        status
    }

    pub fn first_try(&self, reminder_id: &ReminderId) -> Option<bool> {
        self.first_try.get(reminder_id).copied()
    }

    pub fn was_snoozed(&self, reminder_id: &ReminderId) -> bool {
        self.snoozed.contains(reminder_id)
    }

    pub fn summary(&self) -> DaySummary {
        DaySummary {
            tracked: self.first_try.len(),
            taken_on_first_try: self.first_try.values().filter(|taken| **taken).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_try.is_empty() && self.snoozed.is_empty()
    }
}

/// Injectable home for [`DailyReminderStatus`], keyed by user and local day.
#[async_trait]
pub trait DailyStatusStore: Send + Sync {
    /// Apply one resolved reminder to the user's map for `day` and return
    /// the resulting summary.
    async fn apply(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        reminder_id: &ReminderId,
        status: AdherenceStatus,
    ) -> Result<DaySummary, DomainError>;

    async fn get(
        &self,
        user_id: &UserId,
        day: NaiveDate,
    ) -> Result<Option<DailyReminderStatus>, DomainError>;

    /// Replace the user's map for `day`
    async fn replace(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        status: DailyReminderStatus,
    ) -> Result<(), DomainError>;

    /// Forget everything tracked for a user
    async fn clear_user(&self, user_id: &UserId) -> Result<(), DomainError>;

    /// Drop every entry for days strictly before `day`; returns how many
    /// (user, day) entries were removed.
    async fn evict_before(&self, day: NaiveDate) -> Result<usize, DomainError>;
}
