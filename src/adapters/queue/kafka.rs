//! Stream-log provider.
//!
//! Kafka has no implicit topic creation and no delete-by-id, so connect
//! creates the topic and delete consumes one message under a dedicated group
//! and commits it ([`StreamLog::take_one`]). The message itself stays in the
//! log until retention.

use crate::adapters::queue::TEST_MESSAGE;
use crate::config::QueueConfig;
use crate::core::deadline::{Deadline, DeadlinePolicy};
use crate::domain::model::{BackendFamily, Completion, HandlePolicy, PhaseOutcome};
use crate::domain::ports::Probe;
use crate::utils::error::{ProbeError, Result};
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;

pub const DELETE_GROUP_ID: &str = "precheck-delete";
pub const PROBE_PARTITION: i32 = 0;

/// A record read and committed by [`StreamLog::take_one`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub partition: i32,
    pub offset: i64,
    pub payload: String,
}

/// The broker calls the Kafka probe makes.
#[async_trait]
pub trait StreamLog: Send + Sync {
    /// Creates `topic` with one partition unless it already exists.
    async fn ensure_topic(&self, topic: &str) -> Result<()>;

    /// High minus low watermark of [`PROBE_PARTITION`].
    async fn read_lag(&self, topic: &str) -> Result<i64>;

    async fn produce(&self, topic: &str, payload: &str) -> Result<()>;

    /// Reads the next record for `group` and commits its offset.
    async fn take_one(&self, topic: &str, group: &str) -> Result<LogRecord>;
}

/// [`StreamLog`] over librdkafka.
pub struct RdKafkaLog {
    brokers: Vec<String>,
    deadline: Deadline,
}

impl RdKafkaLog {
    pub fn new(brokers: &[String], deadline: Deadline) -> Self {
        let brokers = brokers
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        Self { brokers, deadline }
    }

    fn timeout_ms(&self) -> String {
        self.deadline.timeout().as_millis().to_string()
    }

    fn client_config(&self, bootstrap: &str) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", bootstrap)
            .set("socket.timeout.ms", self.timeout_ms())
            .set("socket.connection.setup.timeout.ms", self.timeout_ms());
        config
    }
}

#[async_trait]
impl StreamLog for RdKafkaLog {
    /// Dials the first broker, discovers the cluster and creates the topic
    /// with replication factor 1.
    async fn ensure_topic(&self, topic: &str) -> Result<()> {
        let first = self
            .brokers
            .first()
            .cloned()
            .ok_or_else(|| ProbeError::MissingConfigError {
                field: "brokers".to_string(),
            })?;
        tracing::debug!("Kafka bootstrap broker {}", first);

        let metadata_config = self.client_config(&first);
        let timeout = self.deadline.timeout();
        let wanted = topic.to_string();
        let brokers = self
            .deadline
            .scoped("kafka dial", async move {
                tokio::task::spawn_blocking(move || -> std::result::Result<Vec<String>, KafkaError> {
                    let consumer: BaseConsumer = metadata_config.create()?;
                    let metadata = consumer.fetch_metadata(Some(wanted.as_str()), timeout)?;
                    Ok(metadata
                        .brokers()
                        .iter()
                        .map(|b| format!("{}:{}", b.host(), b.port()))
                        .collect())
                })
                .await
                .map_err(|e| ProbeError::connection("kafka dial", e))?
                .map_err(|e| ProbeError::connection("kafka dial", e))
            })
            .await?;
        tracing::debug!("Kafka cluster brokers: {:?}", brokers);

        // The admin client routes CreateTopics to the cluster controller.
        let admin: AdminClient<DefaultClientContext> = self
            .client_config(&first)
            .create()
            .map_err(|e| ProbeError::connection("kafka admin", e))?;
        let new_topic = NewTopic::new(topic, 1, TopicReplication::Fixed(1));
        let options = AdminOptions::new().operation_timeout(Some(timeout));

        let results = self
            .deadline
            .scoped("kafka create topic", async {
                admin
                    .create_topics([&new_topic], &options)
                    .await
                    .map_err(|e| ProbeError::operation("kafka create topic", e))
            })
            .await?;

        for result in results {
            match result {
                Ok(name) => tracing::debug!("Kafka topic {} created", name),
                Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    tracing::debug!("Kafka topic {} already exists", name)
                }
                Err((name, code)) => {
                    return Err(ProbeError::operation(
                        "kafka create topic",
                        format!("{}: {}", name, code),
                    ))
                }
            }
        }
        Ok(())
    }

    async fn read_lag(&self, topic: &str) -> Result<i64> {
        let config = self.client_config(&self.brokers.join(","));
        let topic = topic.to_string();
        let timeout = self.deadline.timeout();

        self.deadline
            .scoped("kafka connect", async move {
                tokio::task::spawn_blocking(move || -> std::result::Result<i64, KafkaError> {
                    let consumer: BaseConsumer = config.create()?;
                    let (low, high) = consumer.fetch_watermarks(&topic, PROBE_PARTITION, timeout)?;
                    Ok(high - low)
                })
                .await
                .map_err(|e| ProbeError::connection("kafka connect", e))?
                .map_err(|e| ProbeError::connection("kafka connect", e))
            })
            .await
    }

    async fn produce(&self, topic: &str, payload: &str) -> Result<()> {
        let producer: FutureProducer = self
            .client_config(&self.brokers.join(","))
            .set("message.timeout.ms", self.timeout_ms())
            .create()
            .map_err(|e| ProbeError::connection("kafka write", e))?;

        let record = FutureRecord::<(), str>::to(topic).payload(payload);
        let delivery = self
            .deadline
            .scoped("kafka write", async {
                producer
                    .send(record, self.deadline.timeout())
                    .await
                    .map_err(|(e, _)| ProbeError::operation("kafka write", e))
            })
            .await?;
        tracing::debug!("Kafka delivered message: {:?}", delivery);
        Ok(())
    }

    async fn take_one(&self, topic: &str, group: &str) -> Result<LogRecord> {
        let consumer: StreamConsumer = self
            .client_config(&self.brokers.join(","))
            .set("group.id", group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .create()
            .map_err(|e| ProbeError::connection("kafka consume(delete)", e))?;
        consumer
            .subscribe(&[topic])
            .map_err(|e| ProbeError::connection("kafka consume(delete)", e))?;

        // Always bounded: recv never returns on an empty topic.
        self.deadline
            .required("kafka consume(delete)", async {
                let message = consumer
                    .recv()
                    .await
                    .map_err(|e| ProbeError::operation("kafka consume(delete)", e))?;
                let record = LogRecord {
                    partition: message.partition(),
                    offset: message.offset(),
                    payload: String::from_utf8_lossy(message.payload().unwrap_or_default())
                        .into_owned(),
                };
                consumer
                    .commit_message(&message, CommitMode::Sync)
                    .map_err(|e| ProbeError::operation("kafka consume(delete)", e))?;
                Ok(record)
            })
            .await
    }
}

pub struct KafkaProbe<L: StreamLog = RdKafkaLog> {
    log: L,
    topic: String,
}

impl KafkaProbe<RdKafkaLog> {
    pub fn new(config: QueueConfig, policy: DeadlinePolicy) -> Self {
        let deadline = Deadline::from_secs(config.timeout, policy);
        Self::with_log(config.topic, RdKafkaLog::new(&config.brokers, deadline))
    }
}

impl<L: StreamLog> KafkaProbe<L> {
    pub fn with_log(topic: impl Into<String>, log: L) -> Self {
        Self {
            log,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl<L: StreamLog> Probe for KafkaProbe<L> {
    fn family(&self) -> BackendFamily {
        BackendFamily::Mq
    }

    fn variant(&self) -> &str {
        "kafka"
    }

    fn handle_policy(&self) -> HandlePolicy {
        HandlePolicy::PerPhaseHandle
    }

    async fn connect(&mut self) -> PhaseOutcome {
        self.log.ensure_topic(&self.topic).await.map_err(|e| match e {
            ProbeError::Connection { .. } | ProbeError::MissingConfigError { .. } => {
                ProbeError::connection("kafka create topic", e)
            }
            other => other,
        })?;
        let lag = self.log.read_lag(&self.topic).await?;
        tracing::debug!("Kafka read lag on {}[{}]: {}", self.topic, PROBE_PARTITION, lag);
        Ok(Completion::Done)
    }

    async fn write(&mut self) -> PhaseOutcome {
        self.log.produce(&self.topic, TEST_MESSAGE).await?;
        Ok(Completion::Done)
    }

    async fn delete(&mut self) -> PhaseOutcome {
        let record = self.log.take_one(&self.topic, DELETE_GROUP_ID).await?;
        tracing::debug!(
            "Kafka committed {}[{}]@{} ({:?}) for group {}; the record stays until retention",
            self.topic,
            record.partition,
            record.offset,
            record.payload,
            DELETE_GROUP_ID
        );
        Ok(Completion::Done)
    }
}
