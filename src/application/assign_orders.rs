use anyhow::Result;
use std::sync::Arc;

use crate::domain::courier::Courier;
use crate::domain::dispatch::Dispatcher;
use crate::domain::order::Order;
use crate::ports::{CourierRepository, OrderRepository, UnitOfWork};
use super::CommandError;

// ============================================================================
// AssignOrders Command Handler
// ============================================================================

pub struct AssignOrdersHandler {
    unit_of_work: Arc<dyn UnitOfWork>,
    orders: Arc<dyn OrderRepository>,
    couriers: Arc<dyn CourierRepository>,
    dispatcher: Dispatcher,
}

impl AssignOrdersHandler {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        orders: Arc<dyn OrderRepository>,
        couriers: Arc<dyn CourierRepository>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            unit_of_work,
            orders,
            couriers,
            dispatcher,
        }
    }

    /// One assignment tick: oldest Created order, free couriers, dispatch,
    /// then persist both aggregates under one transaction.
    ///
    /// Dispatch runs before the transaction opens; if anything afterwards
    /// fails, the mutations are discarded with the rollback and both
    /// aggregates are re-read from storage on the next tick.
    pub async fn handle(&self) -> Result<(), CommandError> {
        let Some(mut order) = self.orders.get_first_in_created_status().await? else {
            return Err(CommandError::NotAvailableOrders);
        };

        let free_couriers = self.couriers.get_all_in_free_status().await?;
        if free_couriers.is_empty() {
            return Err(CommandError::NotAvailableCouriers);
        }

        let courier = self.dispatcher.dispatch(&mut order, free_couriers)?;

        self.unit_of_work.begin().await?;
        match self.persist(&mut order, &courier).await {
            Ok(()) => {
                self.unit_of_work.commit().await?;
                tracing::info!(
                    order_id = %order.id(),
                    courier_id = %courier.id(),
                    "Order assigned"
                );
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = self.unit_of_work.rollback().await {
                    tracing::error!(error = %rollback_err, "AssignOrders rollback failed");
                }
                Err(err.into())
            }
        }
    }

    async fn persist(&self, order: &mut Order, courier: &Courier) -> Result<()> {
        self.orders.update(order).await?;
        self.couriers.update(courier).await?;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
