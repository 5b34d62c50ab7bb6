use crate::utils::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Which waits get raced against the probe timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DeadlinePolicy {
    /// Every backend round-trip is bounded.
    #[default]
    Explicit,
    /// Only the RDB ping and the broker-queue consume window are bounded;
    /// everything else relies on the client's own timeouts.
    Legacy,
}

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    timeout: Duration,
    policy: DeadlinePolicy,
}

impl Deadline {
    pub fn new(timeout: Duration, policy: DeadlinePolicy) -> Self {
        Self { timeout, policy }
    }

    pub fn from_secs(secs: u64, policy: DeadlinePolicy) -> Self {
        Self::new(Duration::from_secs(secs), policy)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> DeadlinePolicy {
        self.policy
    }

    /// Races `fut` against the timeout regardless of policy.
    pub async fn required<T, F>(&self, what: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!("{} exceeded {:?}", what, self.timeout);
                Err(ProbeError::Timeout(what))
            }
        }
    }

    /// Races `fut` against the timeout only under [`DeadlinePolicy::Explicit`].
    pub async fn scoped<T, F>(&self, what: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.policy {
            DeadlinePolicy::Explicit => self.required(what, fut).await,
            DeadlinePolicy::Legacy => fut.await,
        }
    }
}
