pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{ProbeCli, ProbeCommand};

pub use config::toml_config::ProbeFile;
pub use config::{CacheConfig, CacheMode, QueueConfig, RdbConfig, StorageConfig};
pub use core::{DeadlinePolicy, ProbeEngine, ProbeSequencer, ProbeTarget, SequencePlan};
pub use domain::model::{PhaseResult, PhaseStatus, ProbeReport};
pub use domain::ports::Probe;
pub use utils::error::{ProbeError, Result};
