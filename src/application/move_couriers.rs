use std::sync::Arc;

use crate::domain::order::Order;
use crate::ports::{CourierRepository, OrderRepository, UnitOfWork};
use super::CommandError;

// ============================================================================
// MoveCouriers Command Handler
// ============================================================================

pub struct MoveCouriersHandler {
    unit_of_work: Arc<dyn UnitOfWork>,
    orders: Arc<dyn OrderRepository>,
    couriers: Arc<dyn CourierRepository>,
}

impl MoveCouriersHandler {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        orders: Arc<dyn OrderRepository>,
        couriers: Arc<dyn CourierRepository>,
    ) -> Self {
        Self {
            unit_of_work,
            orders,
            couriers,
        }
    }

    /// One movement tick: every Assigned order's courier advances one step;
    /// couriers that arrive complete their order and free themselves. The
    /// whole batch commits or rolls back as one transaction: a failure on
    /// any order discards the entire tick, and the next tick redoes it from
    /// the re-read Assigned set (movement is idempotent at the destination,
    /// so redone work converges).
    pub async fn handle(&self) -> Result<(), CommandError> {
        let assigned_orders = self.orders.get_all_in_assigned_status().await?;
        if assigned_orders.is_empty() {
            return Ok(());
        }

        self.unit_of_work.begin().await?;
        match self.advance_all(assigned_orders).await {
            Ok(()) => {
                self.unit_of_work.commit().await?;
                Ok(())
            }
            Err(err) => {
                if let Err(rollback_err) = self.unit_of_work.rollback().await {
                    tracing::error!(error = %rollback_err, "MoveCouriers rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn advance_all(&self, assigned_orders: Vec<Order>) -> Result<(), CommandError> {
        for mut order in assigned_orders {
            let courier_id = order.courier_id().ok_or_else(|| {
                anyhow::anyhow!("assigned order {} has no courier recorded", order.id())
            })?;

            let Some(mut courier) = self.couriers.get(courier_id).await? else {
                return Err(CommandError::CourierNotFound {
                    courier_id,
                    order_id: order.id(),
                });
            };

            courier.move_towards(order.location());

            if courier.location() == order.location() {
                order.complete()?;
                courier.set_free()?;
                tracing::info!(
                    order_id = %order.id(),
                    courier_id = %courier.id(),
                    "Order delivered"
                );
            }

            self.orders.update(&mut order).await?;
            self.couriers.update(&courier).await?;
        }

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::courier::Courier;
    use crate::domain::kernel::Location;
    use crate::domain::order::OrderStatus;
    use crate::ports::OutboxRepository;
    use crate::storage::InMemoryStore;
    use uuid::Uuid;

    fn loc(x: i32, y: i32) -> Location {
        Location::new(x, y).unwrap()
    }

    fn handler(store: &Arc<InMemoryStore>) -> MoveCouriersHandler {
        MoveCouriersHandler::new(store.clone(), store.clone(), store.clone())
    }

    /// Seed an order already assigned to `courier_id`.
    async fn seed_assigned_order(
        store: &Arc<InMemoryStore>,
        destination: Location,
        courier_id: Uuid,
    ) -> Uuid {
        let mut order = Order::new(Uuid::new_v4(), destination).unwrap();
        order.assign_to(courier_id).unwrap();
        OrderRepository::add(store.as_ref(), &mut order).await.unwrap();
        order.id()
    }

    async fn seed_busy_courier(store: &Arc<InMemoryStore>, at: Location, speed: i32) -> Uuid {
        let mut courier = Courier::new("courier", "bike", speed, at).unwrap();
        courier.set_busy().unwrap();
        CourierRepository::add(store.as_ref(), &courier).await.unwrap();
        courier.id()
    }

    #[tokio::test]
    async fn test_no_assigned_orders_is_a_no_op() {
        let store = InMemoryStore::new();
        handler(&store).handle().await.unwrap();
    }

    #[tokio::test]
    async fn test_courier_advances_one_tick_toward_the_order() {
        let store = InMemoryStore::new();
        let courier_id = seed_busy_courier(&store, loc(1, 1), 2).await;
        let order_id = seed_assigned_order(&store, loc(1, 9), courier_id).await;

        handler(&store).handle().await.unwrap();

        let courier = CourierRepository::get(store.as_ref(), courier_id).await.unwrap().unwrap();
        assert_eq!(courier.location(), loc(1, 3));
        assert!(courier.is_busy());

        let order = OrderRepository::get(store.as_ref(), order_id).await.unwrap().unwrap();
        assert_eq!(order.status(), OrderStatus::Assigned);
    }

    #[tokio::test]
    async fn test_arrival_completes_order_and_frees_courier_in_same_tick() {
        let store = InMemoryStore::new();
        let courier_id = seed_busy_courier(&store, loc(3, 4), 2).await;
        let order_id = seed_assigned_order(&store, loc(3, 3), courier_id).await;

        handler(&store).handle().await.unwrap();

        let order = OrderRepository::get(store.as_ref(), order_id).await.unwrap().unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);

        let courier = CourierRepository::get(store.as_ref(), courier_id).await.unwrap().unwrap();
        assert!(courier.is_free());
        assert_eq!(courier.location(), loc(3, 3));

        // The completion fact was captured in the same committed transaction.
        let pending = store.get_not_published_messages(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].name, "OrderCompleted");
    }

    #[tokio::test]
    async fn test_all_assigned_orders_move_in_one_tick() {
        let store = InMemoryStore::new();
        let first_courier = seed_busy_courier(&store, loc(1, 1), 1).await;
        let second_courier = seed_busy_courier(&store, loc(9, 9), 1).await;
        seed_assigned_order(&store, loc(5, 5), first_courier).await;
        seed_assigned_order(&store, loc(5, 5), second_courier).await;

        handler(&store).handle().await.unwrap();

        let first = CourierRepository::get(store.as_ref(), first_courier).await.unwrap().unwrap();
        let second = CourierRepository::get(store.as_ref(), second_courier).await.unwrap().unwrap();
        assert_eq!(first.location(), loc(2, 1));
        assert_eq!(second.location(), loc(8, 9));
    }

    #[tokio::test]
    async fn test_failure_on_one_order_rolls_back_the_whole_batch() {
        let store = InMemoryStore::new();
        let courier_id = seed_busy_courier(&store, loc(1, 1), 2).await;
        seed_assigned_order(&store, loc(9, 9), courier_id).await;
        // Second assigned order points at a courier the store has never seen.
        seed_assigned_order(&store, loc(5, 5), Uuid::new_v4()).await;

        let result = handler(&store).handle().await;
        assert!(matches!(result, Err(CommandError::CourierNotFound { .. })));

        // The first courier's progress was rolled back with the batch.
        let courier = CourierRepository::get(store.as_ref(), courier_id).await.unwrap().unwrap();
        assert_eq!(courier.location(), loc(1, 1));
    }
}
