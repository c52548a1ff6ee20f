use uuid::Uuid;

use crate::domain::courier::CourierError;
use crate::domain::dispatch::DispatchError;
use crate::domain::errors::ValidationError;
use crate::domain::order::OrderError;

// ============================================================================
// Application Layer - Command Handlers
// ============================================================================
//
// Handlers share one pattern: validate the command, read the aggregates,
// invoke domain logic, then persist every mutated aggregate inside one
// unit-of-work scope. Errors are never swallowed here; the scheduler logs
// them and retries on the next tick.
//
// ============================================================================

pub mod assign_orders;
pub mod create_order;
pub mod move_couriers;

pub use assign_orders::*;
pub use create_order::*;
pub use move_couriers::*;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No order is waiting for assignment; distinct from failure so the
    /// scheduler can treat an idle tick quietly.
    #[error("no orders awaiting assignment")]
    NotAvailableOrders,

    /// No courier is free to take an order.
    #[error("no couriers available")]
    NotAvailableCouriers,

    /// Idempotency guard against duplicate delivery of the upstream trigger.
    #[error("order {0} already exists")]
    OrderAlreadyExists(Uuid),

    #[error("courier {courier_id} assigned to order {order_id} not found")]
    CourierNotFound { courier_id: Uuid, order_id: Uuid },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Courier(#[from] CourierError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

impl CommandError {
    /// True for the sentinel outcomes that mean an idle tick, not a failure.
    pub fn is_nothing_to_do(&self) -> bool {
        matches!(
            self,
            CommandError::NotAvailableOrders | CommandError::NotAvailableCouriers
        )
    }
}

// ============================================================================
// End-to-End Lifecycle Test
// ============================================================================
