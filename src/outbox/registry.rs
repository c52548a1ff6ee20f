use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::message::OutboxMessage;

// ============================================================================
// Event Registry - Type Name to Publish Strategy
// ============================================================================
//
// Each registered event type carries its own decode-and-publish logic, looked
// up by the type name stored on the message. Adding an event type means
// registering one more handler at startup; there is no central dispatch
// switch and no runtime type inspection.
//
// ============================================================================

/// Decodes a message payload of one known event type and hands the event to
/// its broker-bound destination.
#[async_trait]
pub trait OutboxMessageHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown outbox message type: {0}")]
    UnknownMessageType(String),
}

#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<String, Arc<dyn OutboxMessageHandler>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, handler: Arc<dyn OutboxMessageHandler>) {
        self.handlers.insert(name.to_string(), handler);
    }

    /// Decode the message and publish it through the handler registered for
    /// its type name. An unregistered type name fails loudly rather than
    /// being dropped.
    pub async fn dispatch(&self, message: &OutboxMessage) -> Result<()> {
        let handler = self
            .handlers
            .get(&message.name)
            .ok_or_else(|| RegistryError::UnknownMessageType(message.name.clone()))?;

        handler.handle(&message.payload).await
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
