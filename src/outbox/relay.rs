use anyhow::Result;
use std::sync::Arc;

use crate::ports::OutboxRepository;
use super::registry::EventRegistry;

// ============================================================================
// Outbox Relay - At-Least-Once Publication
// ============================================================================

/// How many unprocessed messages one relay tick drains at most.
pub const RELAY_BATCH_SIZE: usize = 20;

/// Publishes captured domain facts to the broker.
///
/// Each tick fetches the oldest unprocessed messages and walks the batch in
/// order. A message that fails to decode or publish is skipped; the rest of
/// the batch still runs, and the failed message stays eligible on the next
/// tick. Successes are marked processed and persisted one by one, so a crash
/// mid-batch leaves only the unprocessed tail behind.
pub struct OutboxRelay {
    outbox: Arc<dyn OutboxRepository>,
    registry: Arc<EventRegistry>,
}

impl OutboxRelay {
    pub fn new(outbox: Arc<dyn OutboxRepository>, registry: Arc<EventRegistry>) -> Self {
        Self { outbox, registry }
    }

    pub async fn run_once(&self) -> Result<()> {
        let messages = self.outbox.get_not_published_messages(RELAY_BATCH_SIZE).await?;
        if messages.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = messages.len(), "Relaying outbox messages");

        for mut message in messages {
            if let Err(err) = self.registry.dispatch(&message).await {
                tracing::error!(
                    message_id = %message.id,
                    message_name = %message.name,
                    error = %err,
                    "Failed to publish outbox message, leaving it for the next tick"
                );
                continue;
            }

            message.mark_processed();
            if let Err(err) = self.outbox.update(&message).await {
                tracing::error!(
                    message_id = %message.id,
                    error = %err,
                    "Published but failed to mark processed; message will be re-published"
                );
            }
        }

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
