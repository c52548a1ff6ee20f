use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::kernel::Location;
use crate::domain::order::{Order, OrderCompleted};
use crate::outbox::OutboxMessage;

// ============================================================================
// Ports - Interfaces to External Collaborators
// ============================================================================
//
// The engine owns these contracts; adapters (in-memory store, Kafka clients,
// geo resolver) implement them. "Not found" is a distinct outcome from
// failure everywhere: lookups return Ok(None) / an empty Vec, never an error.
//
// ============================================================================

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order. Domain events captured on the aggregate are
    /// drained into the outbox within the same transaction.
    async fn add(&self, order: &mut Order) -> Result<()>;

    /// Persist an updated order, draining captured events likewise.
    async fn update(&self, order: &mut Order) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Order>>;

    /// The oldest order still awaiting assignment.
    async fn get_first_in_created_status(&self) -> Result<Option<Order>>;

    async fn get_all_in_assigned_status(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait CourierRepository: Send + Sync {
    async fn add(&self, courier: &Courier) -> Result<()>;

    async fn update(&self, courier: &Courier) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Courier>>;

    async fn get_all_in_free_status(&self) -> Result<Vec<Courier>>;
}

#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Unprocessed messages ordered by occurrence time, oldest first.
    async fn get_not_published_messages(&self, limit: usize) -> Result<Vec<OutboxMessage>>;

    async fn update(&self, message: &OutboxMessage) -> Result<()>;
}

/// Demarcates a transaction shared by every repository write issued between
/// `begin` and `commit`. Commit or rollback without an open transaction is a
/// no-op, not an error.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin(&self) -> Result<()>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;
}

#[async_trait]
pub trait GeoClient: Send + Sync {
    /// Resolve a street to its delivery location. Failures propagate to the
    /// caller verbatim; no retry happens at this boundary.
    async fn get_geolocation(&self, street: &str) -> Result<Location>;
}

/// Broker-bound publisher for completion facts.
///
/// Delivery is at-least-once: the relay may re-publish a fact whose
/// processed-at write failed, so consumers must deduplicate by event id.
#[async_trait]
pub trait OrderProducer: Send + Sync {
    async fn publish(&self, event: &OrderCompleted) -> Result<()>;
}
