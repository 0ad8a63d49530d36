use async_trait::async_trait;
use medisort_domain::shared::DomainError;

/// Command handler trait (CQRS write side)
#[async_trait]
pub trait CommandHandler<C>: Send + Sync {
    type Result: Send;

    async fn handle(&self, cmd: C) -> Result<Self::Result, DomainError>;
}
