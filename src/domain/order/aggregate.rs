use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::errors::ValidationError;
use crate::domain::kernel::Location;
use super::errors::OrderError;
use super::events::OrderCompleted;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

/// Status is monotonic: Created → Assigned → Completed, no regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Assigned,
    Completed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "created"),
            OrderStatus::Assigned => write!(f, "assigned"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A delivery order. Holds its assigned courier by identity only; the courier
/// aggregate is owned elsewhere. Completion captures an `OrderCompleted`
/// event on the aggregate until the persistence layer drains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    location: Location,
    status: OrderStatus,
    courier_id: Option<Uuid>,

    #[serde(skip)]
    pending_events: Vec<OrderCompleted>,
}

impl Order {
    pub fn new(id: Uuid, location: Location) -> Result<Self, OrderError> {
        if id.is_nil() {
            return Err(ValidationError::ValueIsInvalid("order id must not be nil").into());
        }

        Ok(Self {
            id,
            location,
            status: OrderStatus::Created,
            courier_id: None,
            pending_events: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn courier_id(&self) -> Option<Uuid> {
        self.courier_id
    }

    pub fn is_assigned(&self) -> bool {
        self.status == OrderStatus::Assigned && self.courier_id.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Assigning to the courier that already holds the order is idempotent;
    /// assigning to a different one while assigned is an invariant violation.
    pub fn assign_to(&mut self, courier_id: Uuid) -> Result<(), OrderError> {
        if self.is_completed() {
            return Err(OrderError::AlreadyCompleted);
        }

        if self.is_assigned() && self.courier_id != Some(courier_id) {
            return Err(OrderError::AlreadyAssigned);
        }

        self.status = OrderStatus::Assigned;
        self.courier_id = Some(courier_id);

        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), OrderError> {
        if !self.is_assigned() {
            return Err(OrderError::NotAssigned);
        }

        self.status = OrderStatus::Completed;
        let event = OrderCompleted::new(self);
        self.pending_events.push(event);

        Ok(())
    }

    /// Drain the events captured since the last successful persist. Called by
    /// the repository inside the write transaction.
    pub fn take_events(&mut self) -> Vec<OrderCompleted> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn pending_events(&self) -> &[OrderCompleted] {
        &self.pending_events
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
