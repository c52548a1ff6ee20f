use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainEvent;

// ============================================================================
// Outbox Message - Durable Event Envelope
// ============================================================================

/// A domain event serialized for deferred publication. Written in the same
/// transaction as the aggregate change that produced it; `processed_at` is
/// set once the relay has published it. Messages are never deleted, so the
/// outbox doubles as an audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub name: String,
    pub payload: Vec<u8>,
    pub occurred_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl OutboxMessage {
    /// Encode a domain event into its outbox envelope.
    pub fn encode<E: DomainEvent>(event: &E) -> Result<Self> {
        let payload = serde_json::to_vec(event)
            .with_context(|| format!("failed to encode {} event", event.name()))?;

        Ok(Self {
            id: event.event_id(),
            name: event.name().to_string(),
            payload,
            occurred_at: Utc::now(),
            processed_at: None,
        })
    }

    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }

    pub fn mark_processed(&mut self) {
        self.processed_at = Some(Utc::now());
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
