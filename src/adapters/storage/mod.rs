pub mod oss;
pub mod s3;

use crate::adapters::UnsupportedProbe;
use crate::config::StorageConfig;
use crate::core::deadline::DeadlinePolicy;
use crate::domain::model::BackendFamily;
use crate::domain::ports::Probe;

pub use oss::OssProbe;
pub use s3::{S3Flavor, S3Probe};

pub const TEST_OBJECT: &str = "precheck_test_object.txt";
pub const TEST_CONTENT: &str = "hello precheck";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    /// MinIO and other path-style S3 servers.
    PathStyle,
    /// Aliyun OSS.
    CloudVendor,
    /// AWS S3 or anything speaking its API at a custom endpoint.
    AwsCompatible,
}

impl StorageProvider {
    pub fn from_literal(provider: &str) -> Option<Self> {
        match provider.trim().to_lowercase().as_str() {
            "minio" => Some(Self::PathStyle),
            "oss" => Some(Self::CloudVendor),
            "s3" => Some(Self::AwsCompatible),
            _ => None,
        }
    }
}

pub fn storage_probe(config: StorageConfig, policy: DeadlinePolicy) -> Box<dyn Probe> {
    match StorageProvider::from_literal(&config.provider) {
        Some(StorageProvider::PathStyle) => Box::new(S3Probe::new(config, S3Flavor::PathStyle, policy)),
        Some(StorageProvider::CloudVendor) => Box::new(OssProbe::new(config, policy)),
        Some(StorageProvider::AwsCompatible) => {
            Box::new(S3Probe::new(config, S3Flavor::AwsCompatible, policy))
        }
        None => Box::new(UnsupportedProbe::new(BackendFamily::Storage, config.provider)),
    }
}

/// Drops any `http://` or `https://` prefix and trailing slashes.
pub fn trim_protocol(endpoint: &str) -> &str {
    let trimmed = endpoint.trim();
    trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/')
}

/// The scheme always follows the `secure` flag, whatever the endpoint said.
pub fn normalize_endpoint(endpoint: &str, secure: bool) -> String {
    let scheme = if secure { "https" } else { "http" };
    format!("{}://{}", scheme, trim_protocol(endpoint))
}
