use async_trait::async_trait;
use log::{debug, error};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use medisort_domain::events::{DomainEvent, DynamicEventHandler, EventBus};
use medisort_domain::shared::DomainError;

/// In-memory event bus. Handlers run in subscription order on the
/// publisher's task; a failing handler is logged and skipped.
pub struct InMemoryEventBus {
    handlers: Arc<RwLock<HashMap<String, Vec<Arc<dyn DynamicEventHandler>>>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe a handler to a specific event type
    pub async fn subscribe<E: DomainEvent + 'static>(
        &self,
        handler: Arc<dyn DynamicEventHandler>,
    ) -> Result<(), DomainError> {
        let event_type_name = std::any::type_name::<E>();
        if handler.event_type_name() != event_type_name {
            return Err(DomainError::Infrastructure(format!(
                "Handler for {} cannot subscribe to {}",
                handler.event_type_name(),
                event_type_name
            )));
        }

        let mut handlers = self.handlers.write().await;
        handlers
            .entry(event_type_name.to_string())
            .or_default()
            .push(handler);

        debug!("Subscribed handler for event type: {}", event_type_name);
        Ok(())
    }

    pub async fn handler_count<E: DomainEvent + 'static>(&self) -> usize {
        let event_type_name = std::any::type_name::<E>();
        let handlers = self.handlers.read().await;
        handlers.get(event_type_name).map_or(0, |h| h.len())
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        let event_type_name = event.event_type_name();
        debug!("Publishing event: {}", event_type_name);

        // Clone the list so handlers may subscribe without deadlocking
        let event_handlers = {
            let handlers = self.handlers.read().await;
            handlers.get(event_type_name).cloned().unwrap_or_default()
        };

        for handler in event_handlers {
            if let Err(e) = handler.handle_dynamic(event.as_any()).await {
                error!("Handler failed to process event {}: {}", event_type_name, e);
            }
        }

        Ok(())
    }
}
