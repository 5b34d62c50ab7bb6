#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{
    validate_address_list, validate_non_empty_string, validate_port, validate_range, Validate,
};
use serde::{Deserialize, Serialize};

pub const MAX_TIMEOUT_SECS: u64 = 3600;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdbConfig {
    #[serde(default = "RdbConfig::default_driver")]
    pub driver: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "RdbConfig::default_port")]
    pub port: u16,
    #[serde(default = "RdbConfig::default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "db")]
    pub database: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl RdbConfig {
    fn default_driver() -> String {
        "mysql".to_string()
    }

    fn default_port() -> u16 {
        3306
    }

    fn default_username() -> String {
        "root".to_string()
    }
}

impl Default for RdbConfig {
    fn default() -> Self {
        Self {
            driver: Self::default_driver(),
            host: default_host(),
            port: Self::default_port(),
            username: Self::default_username(),
            password: String::new(),
            database: String::new(),
            timeout: default_timeout(),
        }
    }
}

impl Validate for RdbConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("host", &self.host)?;
        validate_port("port", self.port)?;
        validate_range("timeout", self.timeout, 1, MAX_TIMEOUT_SECS)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    #[default]
    Redis,
    Sentinel,
    /// Redis-protocol compatible service, probed like plain redis.
    Credis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "CacheConfig::default_port")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
    #[serde(default = "CacheConfig::default_db")]
    pub db: i64,
    #[serde(default)]
    pub mode: CacheMode,
    #[serde(default)]
    pub sentinels: Vec<String>,
    #[serde(default = "CacheConfig::default_master")]
    pub master: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl CacheConfig {
    fn default_port() -> u16 {
        6379
    }

    fn default_db() -> i64 {
        1
    }

    fn default_master() -> String {
        "mymaster".to_string()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: Self::default_port(),
            password: String::new(),
            db: Self::default_db(),
            mode: CacheMode::default(),
            sentinels: Vec::new(),
            master: Self::default_master(),
            timeout: default_timeout(),
        }
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<()> {
        validate_range("timeout", self.timeout, 1, MAX_TIMEOUT_SECS)?;
        validate_range("db", self.db, 0, i64::from(u16::MAX))?;
        match self.mode {
            CacheMode::Sentinel => {
                validate_address_list("sentinels", &self.sentinels)?;
                validate_non_empty_string("master", &self.master)?;
            }
            CacheMode::Redis | CacheMode::Credis => {
                validate_non_empty_string("host", &self.host)?;
                validate_port("port", self.port)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "QueueConfig::default_provider")]
    pub provider: String,
    #[serde(default)]
    pub brokers: Vec<String>,
    #[serde(default = "QueueConfig::default_topic")]
    pub topic: String,
    #[serde(default)]
    pub host: String,
    #[serde(default = "QueueConfig::default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "QueueConfig::default_vhost")]
    pub vhost: String,
    #[serde(default = "QueueConfig::default_timeout")]
    pub timeout: u64,
}

impl QueueConfig {
    fn default_provider() -> String {
        "rabbitmq".to_string()
    }

    fn default_topic() -> String {
        "laiye_cloud".to_string()
    }

    fn default_port() -> u16 {
        5672
    }

    fn default_vhost() -> String {
        "laiye_cloud".to_string()
    }

    fn default_timeout() -> u64 {
        5
    }

    /// Provider literal after trimming and case folding.
    pub fn provider_key(&self) -> String {
        self.provider.trim().to_lowercase()
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            provider: Self::default_provider(),
            brokers: Vec::new(),
            topic: Self::default_topic(),
            host: String::new(),
            port: Self::default_port(),
            user: String::new(),
            password: String::new(),
            vhost: Self::default_vhost(),
            timeout: Self::default_timeout(),
        }
    }
}

impl Validate for QueueConfig {
    fn validate(&self) -> Result<()> {
        validate_range("timeout", self.timeout, 1, MAX_TIMEOUT_SECS)?;
        // Unknown providers are reported per phase by the dispatcher.
        match self.provider_key().as_str() {
            "kafka" => {
                validate_address_list("brokers", &self.brokers)?;
                validate_non_empty_string("topic", &self.topic)?;
            }
            "rabbitmq" | "mq" => {
                validate_non_empty_string("host", &self.host)?;
                validate_port("port", self.port)?;
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_provider")]
    pub provider: String,
    #[serde(default = "StorageConfig::default_endpoint")]
    pub endpoint: String,
    #[serde(default = "StorageConfig::default_access_key")]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "StorageConfig::default_region")]
    pub region: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub use_path_style: bool,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl StorageConfig {
    fn default_provider() -> String {
        "minio".to_string()
    }

    fn default_endpoint() -> String {
        "127.0.0.1:9000".to_string()
    }

    fn default_access_key() -> String {
        "laiyelaiye".to_string()
    }

    fn default_region() -> String {
        "us-east-1".to_string()
    }

    pub fn provider_key(&self) -> String {
        self.provider.trim().to_lowercase()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: Self::default_provider(),
            endpoint: Self::default_endpoint(),
            access_key: Self::default_access_key(),
            secret_key: String::new(),
            bucket: String::new(),
            region: Self::default_region(),
            secure: false,
            use_path_style: false,
            timeout: default_timeout(),
        }
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("endpoint", &self.endpoint)?;
        validate_non_empty_string("bucket", &self.bucket)?;
        validate_non_empty_string("region", &self.region)?;
        validate_range("timeout", self.timeout, 1, MAX_TIMEOUT_SECS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ProbeError;

    #[test]
    fn test_defaults_match_cli_defaults() {
        let rdb = RdbConfig::default();
        assert_eq!((rdb.driver.as_str(), rdb.port, rdb.timeout), ("mysql", 3306, 10));

        let cache = CacheConfig::default();
        assert_eq!((cache.port, cache.db, cache.mode), (6379, 1, CacheMode::Redis));

        let queue = QueueConfig::default();
        assert_eq!(queue.topic, "laiye_cloud");
        assert_eq!(queue.vhost, "laiye_cloud");

        let storage = StorageConfig::default();
        assert_eq!(storage.endpoint, "127.0.0.1:9000");
        assert_eq!(storage.region, "us-east-1");
    }

    #[test]
    fn test_sentinel_mode_requires_addresses() {
        let config = CacheConfig {
            mode: CacheMode::Sentinel,
            ..CacheConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ProbeError::MissingConfigError { ref field }) if field == "sentinels"
        ));

        let config = CacheConfig {
            mode: CacheMode::Sentinel,
            sentinels: vec!["10.0.0.1:26379".to_string()],
            ..CacheConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_kafka_requires_brokers() {
        let config = QueueConfig {
            provider: "Kafka".to_string(),
            brokers: vec![String::new()],
            ..QueueConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_queue_provider_passes_validation() {
        let config = QueueConfig {
            provider: "bogus".to_string(),
            ..QueueConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_requires_bucket() {
        assert!(StorageConfig::default().validate().is_err());
    }
}
