use async_trait::async_trait;

use super::ReminderOccurrence;
use crate::shared::DomainError;

/// Delivery of a due reminder to the user (Strategy pattern).
/// The platform notification service sits behind this trait.
#[async_trait]
pub trait ReminderNotifier: Send + Sync {
    async fn notify(&self, occurrence: &ReminderOccurrence) -> Result<(), DomainError>;
}
