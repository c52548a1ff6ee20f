use async_trait::async_trait;
use std::sync::Arc;

use crate::application::{AssignOrdersHandler, MoveCouriersHandler};
use crate::outbox::OutboxRelay;

// ============================================================================
// Periodic Jobs - Assignment, Movement, and Outbox Relay
// ============================================================================
//
// Jobs own the "log and continue" policy: a failed tick is reported and the
// next tick retries from freshly read state. Handlers never retry themselves.
//
// ============================================================================

pub mod scheduler;

pub use scheduler::Scheduler;

/// One periodic trigger. `run` is awaited to completion before the same
/// trigger fires again, so a slow tick can never overlap its successor.
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self);
}

pub struct AssignOrdersJob {
    handler: Arc<AssignOrdersHandler>,
}

impl AssignOrdersJob {
    pub fn new(handler: Arc<AssignOrdersHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl Job for AssignOrdersJob {
    fn name(&self) -> &'static str {
        "assign_orders"
    }

    async fn run(&self) {
        match self.handler.handle().await {
            Ok(()) => {}
            Err(err) if err.is_nothing_to_do() => {
                tracing::debug!(reason = %err, "Nothing to assign this tick");
            }
            Err(err) => {
                tracing::error!(error = %err, "AssignOrders tick failed");
            }
        }
    }
}

pub struct MoveCouriersJob {
    handler: Arc<MoveCouriersHandler>,
}

impl MoveCouriersJob {
    pub fn new(handler: Arc<MoveCouriersHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl Job for MoveCouriersJob {
    fn name(&self) -> &'static str {
        "move_couriers"
    }

    async fn run(&self) {
        if let Err(err) = self.handler.handle().await {
            tracing::error!(error = %err, "MoveCouriers tick failed");
        }
    }
}

pub struct OutboxRelayJob {
    relay: Arc<OutboxRelay>,
}

impl OutboxRelayJob {
    pub fn new(relay: Arc<OutboxRelay>) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl Job for OutboxRelayJob {
    fn name(&self) -> &'static str {
        "outbox_relay"
    }

    async fn run(&self) {
        if let Err(err) = self.relay.run_once().await {
            tracing::error!(error = %err, "Outbox relay tick failed");
        }
    }
}
