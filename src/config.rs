use std::time::Duration;

// ============================================================================
// Configuration - Environment-Driven with Runnable Defaults
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub kafka_brokers: String,
    pub kafka_consumer_group: String,
    pub basket_confirmed_topic: String,
    pub order_completed_topic: String,
    pub assign_orders_interval: Duration,
    pub move_couriers_interval: Duration,
    pub outbox_relay_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            kafka_brokers: env_or("KAFKA_BROKERS", "127.0.0.1:9092"),
            kafka_consumer_group: env_or("KAFKA_CONSUMER_GROUP", "delivery"),
            basket_confirmed_topic: env_or("KAFKA_BASKET_CONFIRMED_TOPIC", "basket.confirmed"),
            order_completed_topic: env_or("KAFKA_ORDER_COMPLETED_TOPIC", "order.status.changed"),
            assign_orders_interval: millis_env_or("ASSIGN_ORDERS_INTERVAL_MS", 1_000),
            move_couriers_interval: millis_env_or("MOVE_COURIERS_INTERVAL_MS", 2_000),
            outbox_relay_interval: millis_env_or("OUTBOX_RELAY_INTERVAL_MS", 3_000),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn millis_env_or(key: &str, default_ms: u64) -> Duration {
    let millis = std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(millis)
}
