use super::courier::{Courier, CourierError};
use super::errors::ValidationError;
use super::order::{Order, OrderError};

// ============================================================================
// Dispatch Service - Nearest-Courier Selection
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Courier(#[from] CourierError),
}

/// Stateless service matching the oldest unassigned order to the free courier
/// that can reach it in the fewest movement ticks.
#[derive(Debug, Default)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Pick the winner among `couriers`, assign `order` to it and mark it
    /// busy, then hand it back for persistence.
    ///
    /// The cost of each candidate is the literal replay of its step function
    /// (`Courier::steps_to`), not distance divided by speed: the X-first
    /// speed split makes those differ on diagonal approaches. Ties resolve
    /// to the first candidate in input order.
    ///
    /// On any mutation failure the error is returned and the caller must
    /// discard all aggregates involved instead of persisting them.
    pub fn dispatch(
        &self,
        order: &mut Order,
        mut couriers: Vec<Courier>,
    ) -> Result<Courier, DispatchError> {
        if couriers.is_empty() {
            return Err(ValidationError::ValueIsRequired("couriers").into());
        }

        let target = order.location();
        let mut best_idx = 0;
        let mut min_steps = couriers[0].steps_to(target);

        for (idx, candidate) in couriers.iter().enumerate().skip(1) {
            let steps = candidate.steps_to(target);
            if steps < min_steps {
                min_steps = steps;
                best_idx = idx;
            }
        }

        let mut winner = couriers.swap_remove(best_idx);

        order.assign_to(winner.id())?;
        winner.set_busy()?;

        tracing::debug!(
            order_id = %order.id(),
            courier_id = %winner.id(),
            steps = min_steps,
            "Dispatched order to nearest courier"
        );

        Ok(winner)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
