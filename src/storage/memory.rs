use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::courier::Courier;
use crate::domain::order::{Order, OrderStatus};
use crate::outbox::OutboxMessage;
use crate::ports::{CourierRepository, OrderRepository, OutboxRepository, UnitOfWork};

// ============================================================================
// In-Memory Store - Repositories + Unit of Work over One State
// ============================================================================
//
// Stands in for the relational store behind the repository and unit-of-work
// ports, with the same transactional contract: writes issued between `begin`
// and `commit` land in a staged overlay that becomes visible atomically on
// commit and vanishes on rollback. Domain events drained from an aggregate
// during a write are captured into the outbox within the same overlay, so an
// event is durably recorded if and only if the aggregate change is.
//
// One write transaction is admitted at a time; a later `begin` waits for the
// open transaction to finish. This is the in-memory stand-in for the
// row-level isolation the transactional design expects from a real store.
//
// ============================================================================

#[derive(Default)]
struct Tables {
    orders: Vec<Order>,
    couriers: Vec<Courier>,
    outbox: Vec<OutboxMessage>,
}

impl Tables {
    fn upsert_order(&mut self, order: Order) {
        match self.orders.iter_mut().find(|o| o.id() == order.id()) {
            Some(existing) => *existing = order,
            None => self.orders.push(order),
        }
    }

    fn upsert_courier(&mut self, courier: Courier) {
        match self.couriers.iter_mut().find(|c| c.id() == courier.id()) {
            Some(existing) => *existing = courier,
            None => self.couriers.push(courier),
        }
    }

    fn upsert_message(&mut self, message: OutboxMessage) {
        match self.outbox.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message,
            None => self.outbox.push(message),
        }
    }
}

struct State {
    base: Tables,
    staged: Option<Tables>,
    // Held while a transaction is open; dropping it admits the next `begin`.
    tx_guard: Option<OwnedMutexGuard<()>>,
}

impl State {
    /// Orders as a transaction-aware view: staged upserts shadow base rows,
    /// staged inserts append. Insertion order (creation order) is preserved.
    fn orders_view(&self) -> Vec<Order> {
        let mut view = self.base.orders.clone();
        if let Some(staged) = &self.staged {
            for order in &staged.orders {
                match view.iter_mut().find(|o| o.id() == order.id()) {
                    Some(existing) => *existing = order.clone(),
                    None => view.push(order.clone()),
                }
            }
        }
        view
    }

    fn couriers_view(&self) -> Vec<Courier> {
        let mut view = self.base.couriers.clone();
        if let Some(staged) = &self.staged {
            for courier in &staged.couriers {
                match view.iter_mut().find(|c| c.id() == courier.id()) {
                    Some(existing) => *existing = courier.clone(),
                    None => view.push(courier.clone()),
                }
            }
        }
        view
    }

    fn outbox_view(&self) -> Vec<OutboxMessage> {
        let mut view = self.base.outbox.clone();
        if let Some(staged) = &self.staged {
            for message in &staged.outbox {
                match view.iter_mut().find(|m| m.id == message.id) {
                    Some(existing) => *existing = message.clone(),
                    None => view.push(message.clone()),
                }
            }
        }
        view
    }

    /// The tables the current scope writes to: the staged overlay inside a
    /// transaction, the base tables outside one.
    fn write_tables(&mut self) -> &mut Tables {
        self.staged.as_mut().unwrap_or(&mut self.base)
    }
}

pub struct InMemoryStore {
    state: Mutex<State>,
    tx_lock: Arc<Mutex<()>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                base: Tables::default(),
                staged: None,
                tx_guard: None,
            }),
            tx_lock: Arc::new(Mutex::new(())),
        })
    }

    fn encode_events(order: &mut Order) -> Result<Vec<OutboxMessage>> {
        let messages = order
            .pending_events()
            .iter()
            .map(OutboxMessage::encode)
            .collect::<Result<Vec<_>>>()?;
        order.take_events();
        Ok(messages)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn begin(&self) -> Result<()> {
        let guard = self.tx_lock.clone().lock_owned().await;
        let mut state = self.state.lock().await;
        state.staged = Some(Tables::default());
        state.tx_guard = Some(guard);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if let Some(staged) = state.staged.take() {
            for order in staged.orders {
                state.base.upsert_order(order);
            }
            for courier in staged.couriers {
                state.base.upsert_courier(courier);
            }
            for message in staged.outbox {
                state.base.upsert_message(message);
            }
            state.tx_guard = None;
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.staged = None;
        state.tx_guard = None;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn add(&self, order: &mut Order) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.orders_view().iter().any(|o| o.id() == order.id()) {
            bail!("order {} already exists in store", order.id());
        }
        let messages = Self::encode_events(order)?;
        let tables = state.write_tables();
        tables.orders.push(order.clone());
        for message in messages {
            tables.upsert_message(message);
        }
        Ok(())
    }

    async fn update(&self, order: &mut Order) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.orders_view().iter().any(|o| o.id() == order.id()) {
            bail!("order {} not found in store", order.id());
        }
        let messages = Self::encode_events(order)?;
        let tables = state.write_tables();
        tables.upsert_order(order.clone());
        for message in messages {
            tables.upsert_message(message);
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state.orders_view().into_iter().find(|o| o.id() == id))
    }

    async fn get_first_in_created_status(&self) -> Result<Option<Order>> {
        let state = self.state.lock().await;
        Ok(state
            .orders_view()
            .into_iter()
            .find(|o| o.status() == OrderStatus::Created))
    }

    async fn get_all_in_assigned_status(&self) -> Result<Vec<Order>> {
        let state = self.state.lock().await;
        Ok(state
            .orders_view()
            .into_iter()
            .filter(|o| o.status() == OrderStatus::Assigned)
            .collect())
    }
}

#[async_trait]
impl CourierRepository for InMemoryStore {
    async fn add(&self, courier: &Courier) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.couriers_view().iter().any(|c| c.id() == courier.id()) {
            bail!("courier {} already exists in store", courier.id());
        }
        state.write_tables().couriers.push(courier.clone());
        Ok(())
    }

    async fn update(&self, courier: &Courier) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.couriers_view().iter().any(|c| c.id() == courier.id()) {
            bail!("courier {} not found in store", courier.id());
        }
        state.write_tables().upsert_courier(courier.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Courier>> {
        let state = self.state.lock().await;
        Ok(state.couriers_view().into_iter().find(|c| c.id() == id))
    }

    async fn get_all_in_free_status(&self) -> Result<Vec<Courier>> {
        let state = self.state.lock().await;
        Ok(state
            .couriers_view()
            .into_iter()
            .filter(|c| c.is_free())
            .collect())
    }
}

#[async_trait]
impl OutboxRepository for InMemoryStore {
    async fn get_not_published_messages(&self, limit: usize) -> Result<Vec<OutboxMessage>> {
        let state = self.state.lock().await;
        let mut unprocessed: Vec<_> = state
            .outbox_view()
            .into_iter()
            .filter(|m| !m.is_processed())
            .collect();
        unprocessed.sort_by_key(|m| m.occurred_at);
        unprocessed.truncate(limit);
        Ok(unprocessed)
    }

    async fn update(&self, message: &OutboxMessage) -> Result<()> {
        let mut state = self.state.lock().await;
        state.write_tables().upsert_message(message.clone());
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kernel::Location;

    fn loc(x: i32, y: i32) -> Location {
        Location::new(x, y).unwrap()
    }

    fn new_order() -> Order {
        Order::new(Uuid::new_v4(), loc(3, 3)).unwrap()
    }

    fn new_courier() -> Courier {
        Courier::new("test courier", "bike", 2, loc(1, 1)).unwrap()
    }

    async fn completed_order(store: &Arc<InMemoryStore>) -> Order {
        let mut order = new_order();
        OrderRepository::add(store.as_ref(), &mut order).await.unwrap();
        order.assign_to(Uuid::new_v4()).unwrap();
        order.complete().unwrap();
        order
    }

    #[tokio::test]
    async fn test_add_and_get_order() {
        let store = InMemoryStore::new();
        let mut order = new_order();

        OrderRepository::add(store.as_ref(), &mut order).await.unwrap();

        let found = OrderRepository::get(store.as_ref(), order.id()).await.unwrap();
        assert_eq!(found, Some(order));
    }

    #[tokio::test]
    async fn test_duplicate_add_fails() {
        let store = InMemoryStore::new();
        let mut order = new_order();

        OrderRepository::add(store.as_ref(), &mut order).await.unwrap();
        assert!(OrderRepository::add(store.as_ref(), &mut order).await.is_err());
    }

    #[tokio::test]
    async fn test_get_missing_is_none_not_error() {
        let store = InMemoryStore::new();
        let found = OrderRepository::get(store.as_ref(), Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());
        let found = CourierRepository::get(store.as_ref(), Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_first_in_created_status_is_oldest() {
        let store = InMemoryStore::new();
        let mut first = new_order();
        let mut second = new_order();
        OrderRepository::add(store.as_ref(), &mut first).await.unwrap();
        OrderRepository::add(store.as_ref(), &mut second).await.unwrap();

        let found = store.get_first_in_created_status().await.unwrap().unwrap();
        assert_eq!(found.id(), first.id());
    }

    #[tokio::test]
    async fn test_free_courier_listing() {
        let store = InMemoryStore::new();
        let free = new_courier();
        let mut busy = new_courier();
        busy.set_busy().unwrap();
        CourierRepository::add(store.as_ref(), &free).await.unwrap();
        CourierRepository::add(store.as_ref(), &busy).await.unwrap();

        let listed = store.get_all_in_free_status().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), free.id());
    }

    #[tokio::test]
    async fn test_commit_makes_staged_writes_visible() {
        let store = InMemoryStore::new();
        let mut order = new_order();
        OrderRepository::add(store.as_ref(), &mut order).await.unwrap();

        store.begin().await.unwrap();
        order.assign_to(Uuid::new_v4()).unwrap();
        OrderRepository::update(store.as_ref(), &mut order).await.unwrap();

        // Reads inside the transaction already see the staged row.
        let inside = OrderRepository::get(store.as_ref(), order.id()).await.unwrap().unwrap();
        assert!(inside.is_assigned());

        store.commit().await.unwrap();

        let after = OrderRepository::get(store.as_ref(), order.id()).await.unwrap().unwrap();
        assert!(after.is_assigned());
    }

    #[tokio::test]
    async fn test_rollback_discards_aggregate_and_outbox_together() {
        let store = InMemoryStore::new();
        let mut order = completed_order(&store).await;

        store.begin().await.unwrap();
        OrderRepository::update(store.as_ref(), &mut order).await.unwrap();

        // Captured event is staged with the aggregate...
        let staged = store.get_not_published_messages(10).await.unwrap();
        assert_eq!(staged.len(), 1);

        store.rollback().await.unwrap();

        // ...and both are gone after rollback.
        let after = OrderRepository::get(store.as_ref(), order.id()).await.unwrap().unwrap();
        assert!(!after.is_completed());
        assert!(store.get_not_published_messages(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_persists_aggregate_and_outbox_together() {
        let store = InMemoryStore::new();
        let mut order = completed_order(&store).await;

        store.begin().await.unwrap();
        OrderRepository::update(store.as_ref(), &mut order).await.unwrap();
        store.commit().await.unwrap();

        let after = OrderRepository::get(store.as_ref(), order.id()).await.unwrap().unwrap();
        assert!(after.is_completed());

        let messages = store.get_not_published_messages(10).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].name, "OrderCompleted");
        assert!(!messages[0].is_processed());
    }

    #[tokio::test]
    async fn test_commit_and_rollback_without_begin_are_no_ops() {
        let store = InMemoryStore::new();
        store.commit().await.unwrap();
        store.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_drains_pending_events() {
        let store = InMemoryStore::new();
        let mut order = completed_order(&store).await;

        OrderRepository::update(store.as_ref(), &mut order).await.unwrap();
        assert!(order.pending_events().is_empty());

        // A second update must not duplicate the captured message.
        OrderRepository::update(store.as_ref(), &mut order).await.unwrap();
        assert_eq!(store.get_not_published_messages(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_outbox_is_ordered_oldest_first_and_limited() {
        let store = InMemoryStore::new();

        // Three completions captured in sequence.
        for _ in 0..3 {
            let mut order = completed_order(&store).await;
            OrderRepository::update(store.as_ref(), &mut order).await.unwrap();
        }

        let messages = store.get_not_published_messages(2).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].occurred_at <= messages[1].occurred_at);
    }

    #[tokio::test]
    async fn test_marking_processed_removes_from_unpublished() {
        let store = InMemoryStore::new();
        let mut order = completed_order(&store).await;
        OrderRepository::update(store.as_ref(), &mut order).await.unwrap();

        let mut message = store.get_not_published_messages(10).await.unwrap().remove(0);
        message.mark_processed();
        OutboxRepository::update(store.as_ref(), &message).await.unwrap();

        assert!(store.get_not_published_messages(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_transaction_waits_for_the_first() {
        let store = InMemoryStore::new();

        store.begin().await.unwrap();

        let store2 = store.clone();
        let waiter = tokio::spawn(async move {
            store2.begin().await.unwrap();
            store2.commit().await.unwrap();
        });

        // The competing begin cannot finish while ours is open.
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        store.commit().await.unwrap();
        waiter.await.unwrap();
    }
}
