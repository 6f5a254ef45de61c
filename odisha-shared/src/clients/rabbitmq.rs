use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, BasicQosOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};
use serde::Serialize;

use crate::types::Event;

/// Topic exchange every service publishes domain events to.
pub const EXCHANGE_NAME: &str = "odisha.events";
const CONSUMER_PREFETCH: u16 = 16;
const PERSISTENT: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("amqp: {0}")]
    Amqp(#[from] lapin::Error),
    #[error("event encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct RabbitMQClient {
    channel: Channel,
}

impl RabbitMQClient {
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let connection = Connection::connect(url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        let durable = ExchangeDeclareOptions { durable: true, ..Default::default() };
        channel
            .exchange_declare(EXCHANGE_NAME, ExchangeKind::Topic, durable, FieldTable::default())
            .await?;
        channel.basic_qos(CONSUMER_PREFETCH, BasicQosOptions::default()).await?;

        tracing::info!(exchange = EXCHANGE_NAME, "connected to RabbitMQ");
        Ok(Self { channel })
    }

    /// Publish with the event type as routing key and wait for the broker confirm.
    pub async fn publish<T: Serialize>(&self, event: &Event<T>) -> Result<(), BrokerError> {
        let payload = serde_json::to_vec(event)?;
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_message_id(event.id.to_string().into())
            .with_delivery_mode(PERSISTENT);

        self.channel
            .basic_publish(
                EXCHANGE_NAME,
                &event.event_type,
                BasicPublishOptions::default(),
                &payload,
                properties,
            )
            .await?
            .await?;

        tracing::debug!(routing_key = %event.event_type, event_id = %event.id, "event published");
        Ok(())
    }

    /// Publishing from request handlers must not fail the request.
    pub async fn publish_or_log<T: Serialize>(&self, event: &Event<T>) {
        if let Err(e) = self.publish(event).await {
            tracing::error!(error = %e, routing_key = %event.event_type, "failed to publish event");
        }
    }

    /// Durable queue bound to `routing_keys`; redeliveries are expected, so
    /// consumers must be idempotent.
    pub async fn subscribe(&self, queue: &str, routing_keys: &[&str]) -> Result<Consumer, BrokerError> {
        let durable = QueueDeclareOptions { durable: true, ..Default::default() };
        self.channel
            .queue_declare(queue, durable, FieldTable::default())
            .await?;

        for key in routing_keys {
            self.channel
                .queue_bind(queue, EXCHANGE_NAME, key, QueueBindOptions::default(), FieldTable::default())
                .await?;
        }

        let consumer = self
            .channel
            .basic_consume(
                queue,
                &consumer_tag(queue),
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        tracing::info!(queue = %queue, bindings = ?routing_keys, "subscribed to RabbitMQ queue");
        Ok(consumer)
    }
}

fn consumer_tag(queue: &str) -> String {
    format!("{queue}.{}", std::process::id())
}
