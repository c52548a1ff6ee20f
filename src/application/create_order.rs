use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::ValidationError;
use crate::domain::order::Order;
use crate::ports::{GeoClient, OrderRepository};
use super::CommandError;

// ============================================================================
// CreateOrder Command Handler
// ============================================================================

/// The validated intent to create an order for delivery to `street`.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    order_id: Uuid,
    street: String,
}

impl CreateOrderCommand {
    pub fn new(order_id: Uuid, street: &str) -> Result<Self, ValidationError> {
        if order_id.is_nil() {
            return Err(ValidationError::ValueIsInvalid("order id must not be nil"));
        }
        if street.trim().is_empty() {
            return Err(ValidationError::ValueIsRequired("street"));
        }
        Ok(Self {
            order_id,
            street: street.to_string(),
        })
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn street(&self) -> &str {
        &self.street
    }
}

pub struct CreateOrderHandler {
    orders: Arc<dyn OrderRepository>,
    geo: Arc<dyn GeoClient>,
}

impl CreateOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, geo: Arc<dyn GeoClient>) -> Self {
        Self { orders, geo }
    }

    /// A single aggregate is written, so no explicit transaction is needed.
    /// Duplicate triggers hit the `OrderAlreadyExists` guard; geolocation
    /// failures propagate verbatim with nothing persisted.
    pub async fn handle(&self, command: CreateOrderCommand) -> Result<(), CommandError> {
        if self.orders.get(command.order_id()).await?.is_some() {
            return Err(CommandError::OrderAlreadyExists(command.order_id()));
        }

        let location = self.geo.get_geolocation(command.street()).await?;

        let mut order = Order::new(command.order_id(), location)?;
        self.orders.add(&mut order).await?;

        tracing::info!(
            order_id = %order.id(),
            street = command.street(),
            location = %order.location(),
            "Order created"
        );

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
