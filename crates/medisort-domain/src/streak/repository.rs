use async_trait::async_trait;

use super::UserStreak;
use crate::shared::{DomainError, UserId};

/// Read-modify-write step applied inside the store's transaction. Receives
/// the stored streak (or the zero default) and returns the value to write.
pub type StreakMutation = Box<dyn FnOnce(UserStreak) -> UserStreak + Send>;

#[async_trait]
pub trait StreakRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<UserStreak>, DomainError>;

    /// Atomically read, mutate and write the user's streak document.
    ///
    /// Concurrent calls for the same user are serialised by the store; the
    /// committed value is returned.
    async fn update_atomically(
        &self,
        user_id: &UserId,
        mutation: StreakMutation,
    ) -> Result<UserStreak, DomainError>;
}
