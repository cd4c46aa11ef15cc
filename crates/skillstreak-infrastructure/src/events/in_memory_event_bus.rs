use async_trait::async_trait;
use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use skillstreak_domain::events::{DomainEvent, DynamicEventHandler, EventBus};
use skillstreak_domain::shared::DomainError;

/// In-process event bus
/// Handlers run in subscription order; a failing handler does not stop the rest
pub struct InMemoryEventBus {
    handlers: Arc<RwLock<HashMap<&'static str, Vec<Arc<dyn DynamicEventHandler>>>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe a handler to a specific event type
    pub async fn subscribe<E: DomainEvent + 'static>(&self, handler: Arc<dyn DynamicEventHandler>) {
        let event_type_name = std::any::type_name::<E>();
        let mut handlers = self.handlers.write().await;

        handlers.entry(event_type_name).or_default().push(handler);

        info!("Subscribed handler for event type: {}", event_type_name);
    }

    pub async fn handler_count<E: DomainEvent + 'static>(&self) -> usize {
        let handlers = self.handlers.read().await;
        handlers
            .get(std::any::type_name::<E>())
            .map_or(0, |h| h.len())
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
        let handlers = self.handlers.read().await;

        let Some(event_handlers) = handlers.get(event_type_name) else {
            debug!("No handlers registered for event type: {}", event_type_name);
            return Ok(());
        };

        debug!(
            "Publishing {} to {} handler(s)",
            event_type_name,
            event_handlers.len()
        );

        for handler in event_handlers {
            if let Err(e) = handler.handle_dynamic(event.as_any()).await {
                error!("Handler failed to process event {}: {}", event_type_name, e);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillstreak_domain::events::{EventHandler, StreakMilestoneReached, TypedEventHandlerWrapper};
    use skillstreak_domain::shared::UserId;
    use skillstreak_domain::streak::StreakType;

    struct RecordingHandler {
        seen: Arc<RwLock<Vec<u32>>>,
    }

    #[async_trait]
    impl EventHandler<StreakMilestoneReached> for RecordingHandler {
        async fn handle(&self, event: &StreakMilestoneReached) -> Result<(), DomainError> {
            self.seen.write().await.push(event.milestone);
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl EventHandler<StreakMilestoneReached> for FailingHandler {
        async fn handle(&self, _event: &StreakMilestoneReached) -> Result<(), DomainError> {
            Err(DomainError::Infrastructure("subscriber offline".to_string()))
        }
    }

    fn wrap<H>(handler: H) -> Arc<dyn DynamicEventHandler>
    where
        H: EventHandler<StreakMilestoneReached> + 'static,
    {
        Arc::new(TypedEventHandlerWrapper::<StreakMilestoneReached, H>::new(handler))
    }

    fn milestone_event(milestone: u32) -> Box<StreakMilestoneReached> {
        Box::new(StreakMilestoneReached::new(
            UserId::from_string("u1"),
            StreakType::Login,
            milestone,
            format!("{milestone}-day login streak"),
        ))
    }

    #[tokio::test]
    async fn test_event_bus_publishes_to_handlers() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(RwLock::new(Vec::new()));

        bus.subscribe::<StreakMilestoneReached>(wrap(RecordingHandler { seen: seen.clone() }))
            .await;

        bus.publish(milestone_event(7)).await.unwrap();

        assert_eq!(*seen.read().await, vec![7]);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_block_others() {
        let bus = InMemoryEventBus::new();
        let seen = Arc::new(RwLock::new(Vec::new()));

        bus.subscribe::<StreakMilestoneReached>(wrap(FailingHandler)).await;
        bus.subscribe::<StreakMilestoneReached>(wrap(RecordingHandler { seen: seen.clone() }))
            .await;

        assert_eq!(bus.handler_count::<StreakMilestoneReached>().await, 2);
        bus.publish(milestone_event(14)).await.unwrap();

        assert_eq!(*seen.read().await, vec![14]);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = InMemoryEventBus::new();
        assert!(bus.publish(milestone_event(3)).await.is_ok());
    }
}
