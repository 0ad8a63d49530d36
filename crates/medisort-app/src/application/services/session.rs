use tokio::sync::RwLock;

use medisort_domain::shared::{DomainError, UserId};

/// The signed-in user, as reported by the authentication collaborator
#[derive(Debug, Default)]
pub struct UserSession {
    current: RwLock<Option<UserId>>,
}

impl UserSession {
    pub fn new(initial: Option<UserId>) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    pub async fn current(&self) -> Option<UserId> {
        self.current.read().await.clone()
    }

    pub async fn require_user(&self) -> Result<UserId, DomainError> {
        self.current()
            .await
            .ok_or_else(|| DomainError::Unauthenticated("no user is signed in".to_string()))
    }

    /// Replace the active user and return the previous one
    pub async fn set(&self, user: Option<UserId>) -> Option<UserId> {
        let mut current = self.current.write().await;
        std::mem::replace(&mut *current, user)
    }
}
