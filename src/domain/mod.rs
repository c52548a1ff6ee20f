// ============================================================================
// Domain Model - Aggregates, Value Objects, and Domain Services
// ============================================================================

pub mod courier;
pub mod dispatch;
pub mod errors;
pub mod kernel;
pub mod order;

use serde::Serialize;
use uuid::Uuid;

/// A fact produced by an aggregate. The name keys the outbox registry; the
/// id lets idempotent consumers deduplicate re-published facts.
pub trait DomainEvent: Serialize + Send + Sync {
    fn event_id(&self) -> Uuid;
    fn name(&self) -> &'static str;
}
