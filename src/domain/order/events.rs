use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainEvent;
use super::aggregate::{Order, OrderStatus};

// ============================================================================
// Order Domain Events
// ============================================================================

/// The fact that an order reached its terminal status. Captured on the
/// aggregate when `Order::complete` succeeds and drained into the outbox by
/// the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCompleted {
    pub id: Uuid,
    pub order_id: Uuid,
    pub order_status: OrderStatus,
}

impl OrderCompleted {
    pub const NAME: &'static str = "OrderCompleted";

    pub fn new(order: &Order) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: order.id(),
            order_status: order.status(),
        }
    }
}

impl DomainEvent for OrderCompleted {
    fn event_id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
