pub mod kafka;
pub mod rabbitmq;

use crate::adapters::UnsupportedProbe;
use crate::config::QueueConfig;
use crate::core::deadline::DeadlinePolicy;
use crate::domain::model::BackendFamily;
use crate::domain::ports::Probe;

pub use kafka::KafkaProbe;
pub use rabbitmq::RabbitMqProbe;

pub const TEST_MESSAGE: &str = "hello";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueProvider {
    /// Topic/partition log (Kafka).
    StreamLog,
    /// Exchange/queue broker (RabbitMQ).
    BrokerQueue,
}

impl QueueProvider {
    pub fn from_literal(provider: &str) -> Option<Self> {
        match provider.trim().to_lowercase().as_str() {
            "kafka" => Some(Self::StreamLog),
            "rabbitmq" | "mq" => Some(Self::BrokerQueue),
            _ => None,
        }
    }
}

pub fn queue_probe(config: QueueConfig, policy: DeadlinePolicy) -> Box<dyn Probe> {
    match QueueProvider::from_literal(&config.provider) {
        Some(QueueProvider::StreamLog) => Box::new(KafkaProbe::new(config, policy)),
        Some(QueueProvider::BrokerQueue) => Box::new(RabbitMqProbe::new(config, policy)),
        None => Box::new(UnsupportedProbe::new(BackendFamily::Mq, config.provider)),
    }
}
