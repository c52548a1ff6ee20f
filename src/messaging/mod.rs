// ============================================================================
// Kafka Adapters - Inbound Trigger and Outbound Publisher
// ============================================================================

pub mod basket_consumer;
pub mod producer;

pub use basket_consumer::BasketConfirmedConsumer;
pub use producer::KafkaOrderProducer;
