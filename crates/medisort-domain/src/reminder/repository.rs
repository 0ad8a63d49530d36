use async_trait::async_trait;

use super::Reminder;
use crate::shared::{DomainError, ReminderId, UserId};

#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Insert or replace a reminder
    async fn save(&self, reminder: &Reminder) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ReminderId) -> Result<Option<Reminder>, DomainError>;

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Reminder>, DomainError>;

    /// Reminders that currently fire (taking medication, at least one day)
    async fn find_active_by_user(&self, user_id: &UserId) -> Result<Vec<Reminder>, DomainError>;

    async fn delete(&self, id: &ReminderId) -> Result<(), DomainError>;
}
