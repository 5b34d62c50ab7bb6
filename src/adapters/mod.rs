// Adapters layer: one Probe implementation per backend variant.

pub mod cache;
pub mod queue;
pub mod rdb;
pub mod storage;

use crate::domain::model::{BackendFamily, HandlePolicy, PhaseOutcome};
use crate::domain::ports::Probe;
use crate::utils::error::ProbeError;
use async_trait::async_trait;

/// Stand-in for a provider literal no adapter recognizes. Every phase fails
/// with "unsupported provider"; the sequencer then skips what follows.
pub struct UnsupportedProbe {
    family: BackendFamily,
    literal: String,
}

impl UnsupportedProbe {
    pub fn new(family: BackendFamily, literal: impl Into<String>) -> Self {
        Self {
            family,
            literal: literal.into(),
        }
    }
}

#[async_trait]
impl Probe for UnsupportedProbe {
    fn family(&self) -> BackendFamily {
        self.family
    }

    fn variant(&self) -> &str {
        &self.literal
    }

    fn handle_policy(&self) -> HandlePolicy {
        HandlePolicy::PerPhaseHandle
    }

    async fn connect(&mut self) -> PhaseOutcome {
        tracing::warn!("{} provider {:?} is not supported", self.family, self.literal);
        Err(ProbeError::UnsupportedProvider)
    }

    async fn write(&mut self) -> PhaseOutcome {
        Err(ProbeError::UnsupportedProvider)
    }

    async fn delete(&mut self) -> PhaseOutcome {
        Err(ProbeError::UnsupportedProvider)
    }
}
