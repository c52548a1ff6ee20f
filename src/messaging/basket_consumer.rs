use anyhow::{Context, Result};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{CommandError, CreateOrderCommand, CreateOrderHandler};

// ============================================================================
// Basket-Confirmed Consumer - Inbound Trigger for CreateOrder
// ============================================================================

/// Integration event published when a basket is checked out; its id becomes
/// the order id, which makes redelivered messages hit the
/// `OrderAlreadyExists` guard instead of creating duplicates.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BasketConfirmed {
    basket_id: Uuid,
    address: Address,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    street: String,
}

pub struct BasketConfirmedConsumer {
    consumer: StreamConsumer,
    topic: String,
    create_order: Arc<CreateOrderHandler>,
}

impl BasketConfirmedConsumer {
    pub fn new(
        brokers: &str,
        group: &str,
        topic: &str,
        create_order: Arc<CreateOrderHandler>,
    ) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()
            .context("failed to create Kafka consumer")?;

        Ok(Self {
            consumer,
            topic: topic.to_string(),
            create_order,
        })
    }

    pub async fn run(&self) -> Result<()> {
        self.consumer
            .subscribe(&[self.topic.as_str()])
            .with_context(|| format!("failed to subscribe to {}", self.topic))?;

        tracing::info!(topic = %self.topic, "Basket consumer listening");

        loop {
            match self.consumer.recv().await {
                Err(err) => {
                    tracing::error!(error = %err, "Kafka receive error");
                }
                Ok(message) => {
                    self.process(&message).await;
                    if let Err(err) = self.consumer.commit_message(&message, CommitMode::Async) {
                        tracing::error!(error = %err, "Offset commit failed");
                    }
                }
            }
        }
    }

    /// Handling errors are logged, never fatal: a malformed message is
    /// skipped, a duplicate hits the idempotency guard, and anything else is
    /// retried by the upstream producer's redelivery.
    async fn process(&self, message: &BorrowedMessage<'_>) {
        let Some(payload) = message.payload() else {
            tracing::warn!("Skipping basket message without payload");
            return;
        };

        let event: BasketConfirmed = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(err) => {
                tracing::error!(error = %err, "Failed to decode basket-confirmed message");
                return;
            }
        };

        let command = match CreateOrderCommand::new(event.basket_id, &event.address.street) {
            Ok(command) => command,
            Err(err) => {
                tracing::error!(error = %err, "Invalid basket-confirmed message");
                return;
            }
        };

        match self.create_order.handle(command).await {
            Ok(()) => {}
            Err(CommandError::OrderAlreadyExists(order_id)) => {
                tracing::debug!(order_id = %order_id, "Duplicate basket message ignored");
            }
            Err(err) => {
                tracing::error!(error = %err, "CreateOrder failed");
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
