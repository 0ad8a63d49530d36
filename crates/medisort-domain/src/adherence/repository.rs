use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::AdherenceRecord;
use crate::shared::{AdherenceId, DomainError, UserId};

#[async_trait]
pub trait AdherenceRepository: Send + Sync {
    /// Insert a new record. Records are never updated; saving an id that
    /// already exists is an error.
    async fn save(&self, record: &AdherenceRecord) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &AdherenceId) -> Result<Option<AdherenceRecord>, DomainError>;

    /// Records of a user with `taken_at` in `[start, end)`, oldest first.
    async fn find_by_user_in_range(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AdherenceRecord>, DomainError>;
}
