use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod application;
mod config;
mod domain;
mod geo;
mod jobs;
mod messaging;
mod outbox;
mod ports;
mod storage;
mod utils;

use application::{AssignOrdersHandler, CreateOrderHandler, MoveCouriersHandler};
use config::Config;
use domain::courier::Courier;
use domain::dispatch::Dispatcher;
use domain::kernel::Location;
use domain::order::OrderCompleted;
use geo::StaticGeoClient;
use jobs::{AssignOrdersJob, MoveCouriersJob, OutboxRelayJob, Scheduler};
use messaging::{BasketConfirmedConsumer, KafkaOrderProducer};
use outbox::{EventRegistry, OrderCompletedHandler, OutboxRelay};
use ports::CourierRepository;
use storage::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging with environment-based filtering; override the
    // default with RUST_LOG.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,delivery=debug")),
        )
        .init();

    tracing::info!("🚚 Starting delivery dispatch engine");

    let config = Config::from_env();

    // === 1. Store behind the repository / unit-of-work ports ===
    let store = InMemoryStore::new();
    seed_couriers(&store).await?;

    // === 2. Domain services and command handlers ===
    let geo = Arc::new(StaticGeoClient::new());
    let create_order = Arc::new(CreateOrderHandler::new(store.clone(), geo));
    let assign_orders = Arc::new(AssignOrdersHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Dispatcher::new(),
    ));
    let move_couriers = Arc::new(MoveCouriersHandler::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));

    // === 3. Outbox relay: registry maps each event type to its publisher ===
    let producer = Arc::new(KafkaOrderProducer::new(
        &config.kafka_brokers,
        &config.order_completed_topic,
    )?);
    let mut registry = EventRegistry::new();
    registry.register(
        OrderCompleted::NAME,
        Arc::new(OrderCompletedHandler::new(producer)),
    );
    let relay = Arc::new(OutboxRelay::new(store.clone(), Arc::new(registry)));

    // === 4. Inbound trigger: basket confirmations become orders ===
    let consumer = BasketConfirmedConsumer::new(
        &config.kafka_brokers,
        &config.kafka_consumer_group,
        &config.basket_confirmed_topic,
        create_order,
    )?;
    let consumer_task = tokio::spawn(async move {
        if let Err(err) = consumer.run().await {
            tracing::error!(error = %err, "Basket consumer stopped");
        }
    });

    // === 5. Periodic triggers, each serialized against itself ===
    let mut scheduler = Scheduler::new();
    scheduler.schedule(
        Arc::new(AssignOrdersJob::new(assign_orders)),
        config.assign_orders_interval,
    );
    scheduler.schedule(
        Arc::new(MoveCouriersJob::new(move_couriers)),
        config.move_couriers_interval,
    );
    scheduler.schedule(
        Arc::new(OutboxRelayJob::new(relay)),
        config.outbox_relay_interval,
    );

    tracing::info!("✅ Dispatch engine running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down");
    scheduler.shutdown().await;
    consumer_task.abort();

    Ok(())
}

/// The production system provisions couriers through its admin surface; the
/// demo binary seeds a fixed fleet instead.
async fn seed_couriers(store: &Arc<InMemoryStore>) -> anyhow::Result<()> {
    let fleet = [
        ("Walker", "on foot", 1, (2, 2)),
        ("Biker", "bicycle", 2, (5, 5)),
        ("Driver", "car", 3, (9, 9)),
    ];

    for (name, transport, speed, (x, y)) in fleet {
        let courier = Courier::new(name, transport, speed, Location::new(x, y)?)?;
        CourierRepository::add(store.as_ref(), &courier).await?;
        tracing::info!(courier = name, transport, speed, "Courier ready");
    }

    Ok(())
}
