use crate::config::{CacheConfig, QueueConfig, RdbConfig, StorageConfig};
use crate::core::deadline::DeadlinePolicy;
use crate::core::engine::ProbeTarget;
use crate::utils::error::{ProbeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run-wide knobs from the `[probe]` table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProbeSection {
    #[serde(default)]
    pub deadline: DeadlinePolicy,
    #[serde(default)]
    pub eager_write: bool,
}

/// A probe run described in TOML. Every backend table is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeFile {
    #[serde(default)]
    pub probe: ProbeSection,
    pub rdb: Option<RdbConfig>,
    pub cache: Option<CacheConfig>,
    pub mq: Option<QueueConfig>,
    pub storage: Option<StorageConfig>,
}

impl ProbeFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;

        toml::from_str(&processed).map_err(|e| ProbeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProbeError::ConfigError {
            message: format!("placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// Targets in run order: rdb, cache, mq, storage.
    pub fn targets(&self) -> Vec<ProbeTarget> {
        let mut targets = Vec::new();
        if let Some(rdb) = &self.rdb {
            targets.push(ProbeTarget::Rdb(rdb.clone()));
        }
        if let Some(cache) = &self.cache {
            targets.push(ProbeTarget::Cache(cache.clone()));
        }
        if let Some(mq) = &self.mq {
            targets.push(ProbeTarget::Mq(mq.clone()));
        }
        if let Some(storage) = &self.storage {
            targets.push(ProbeTarget::Storage(storage.clone()));
        }
        targets
    }
}
