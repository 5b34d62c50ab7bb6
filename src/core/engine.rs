use crate::adapters::cache::CacheProbe;
use crate::adapters::queue::queue_probe;
use crate::adapters::rdb::RdbProbe;
use crate::adapters::storage::storage_probe;
use crate::config::{CacheConfig, QueueConfig, RdbConfig, StorageConfig};
use crate::core::deadline::DeadlinePolicy;
use crate::core::sequencer::{ProbeSequencer, SequencePlan};
use crate::domain::model::{BackendFamily, ProbeReport};
use crate::domain::ports::Probe;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// One backend to check, with its settings.
#[derive(Debug, Clone)]
pub enum ProbeTarget {
    Rdb(RdbConfig),
    Cache(CacheConfig),
    Mq(QueueConfig),
    Storage(StorageConfig),
}

impl ProbeTarget {
    pub fn family(&self) -> BackendFamily {
        match self {
            Self::Rdb(_) => BackendFamily::Rdb,
            Self::Cache(_) => BackendFamily::Cache,
            Self::Mq(_) => BackendFamily::Mq,
            Self::Storage(_) => BackendFamily::Storage,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Rdb(config) => config.validate(),
            Self::Cache(config) => config.validate(),
            Self::Mq(config) => config.validate(),
            Self::Storage(config) => config.validate(),
        }
    }

    pub fn into_probe(self, policy: DeadlinePolicy) -> Box<dyn Probe> {
        match self {
            Self::Rdb(config) => Box::new(RdbProbe::new(config, policy)),
            Self::Cache(config) => Box::new(CacheProbe::new(config, policy)),
            Self::Mq(config) => queue_probe(config, policy),
            Self::Storage(config) => storage_probe(config, policy),
        }
    }
}

/// Validates a target, builds its probe and runs the three phases.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeEngine {
    policy: DeadlinePolicy,
    eager_write: bool,
}

impl ProbeEngine {
    pub fn new(policy: DeadlinePolicy) -> Self {
        Self {
            policy,
            eager_write: false,
        }
    }

    /// Only queue and storage targets honor this.
    pub fn with_eager_write(mut self, eager_write: bool) -> Self {
        self.eager_write = eager_write;
        self
    }

    fn plan_for(&self, family: BackendFamily) -> SequencePlan {
        SequencePlan {
            eager_write: self.eager_write
                && matches!(family, BackendFamily::Mq | BackendFamily::Storage),
        }
    }

    pub async fn run(&self, target: ProbeTarget) -> ProbeReport {
        let family = target.family();
        if let Err(e) = target.validate() {
            tracing::warn!("{} settings rejected: {}", family, e);
            return ProbeReport::rejected(&e);
        }

        let plan = self.plan_for(family);
        ProbeSequencer::with_plan(target.into_probe(self.policy), plan)
            .run()
            .await
    }
}
