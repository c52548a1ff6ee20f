use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::order::OrderCompleted;
use crate::ports::OrderProducer;
use super::registry::OutboxMessageHandler;

// ============================================================================
// Outbox Event Handlers - One Publish Strategy per Event Type
// ============================================================================

/// Routes decoded `OrderCompleted` facts to the broker producer.
pub struct OrderCompletedHandler {
    producer: Arc<dyn OrderProducer>,
}

impl OrderCompletedHandler {
    pub fn new(producer: Arc<dyn OrderProducer>) -> Self {
        Self { producer }
    }
}

#[async_trait]
impl OutboxMessageHandler for OrderCompletedHandler {
    async fn handle(&self, payload: &[u8]) -> Result<()> {
        let event: OrderCompleted =
            serde_json::from_slice(payload).context("failed to decode OrderCompleted payload")?;

        self.producer.publish(&event).await
    }
}
