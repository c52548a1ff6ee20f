use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;

use crate::domain::order::OrderCompleted;
use crate::ports::OrderProducer;
use crate::utils::{BreakerError, CircuitBreaker};

// ============================================================================
// Kafka Completion-Fact Producer
// ============================================================================

pub struct KafkaOrderProducer {
    producer: FutureProducer,
    topic: String,
    circuit_breaker: CircuitBreaker,
}

impl KafkaOrderProducer {
    pub fn new(brokers: &str, topic: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .context("failed to create Kafka producer")?;

        Ok(Self {
            producer,
            topic: topic.to_string(),
            // Open after 5 failures, retry the broker after 30s.
            circuit_breaker: CircuitBreaker::new(5, Duration::from_secs(30)),
        })
    }
}

#[async_trait]
impl OrderProducer for KafkaOrderProducer {
    async fn publish(&self, event: &OrderCompleted) -> Result<()> {
        let payload = serde_json::to_string(event).context("failed to encode completion fact")?;
        let key = event.order_id.to_string();

        let result = self
            .circuit_breaker
            .call(async {
                let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);

                self.producer
                    .send(record, rdkafka::util::Timeout::After(Duration::from_secs(5)))
                    .await
                    .map_err(|(err, _)| anyhow::anyhow!("Kafka send error: {err}"))?;

                Ok::<(), anyhow::Error>(())
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    topic = %self.topic,
                    order_id = %event.order_id,
                    event_id = %event.id,
                    "Published completion fact"
                );
                Ok(())
            }
            Err(BreakerError::Open) => {
                tracing::error!(
                    topic = %self.topic,
                    order_id = %event.order_id,
                    "Circuit breaker open - broker unavailable"
                );
                Err(anyhow::anyhow!("circuit breaker open for Kafka producer"))
            }
            Err(BreakerError::Inner(err)) => {
                tracing::error!(
                    topic = %self.topic,
                    order_id = %event.order_id,
                    error = %err,
                    "Failed to publish completion fact"
                );
                Err(err)
            }
        }
    }
}
