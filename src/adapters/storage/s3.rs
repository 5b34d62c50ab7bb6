use crate::adapters::storage::{normalize_endpoint, TEST_CONTENT, TEST_OBJECT};
use crate::config::StorageConfig;
use crate::core::deadline::{Deadline, DeadlinePolicy};
use crate::domain::model::{BackendFamily, Completion, HandlePolicy, PhaseOutcome};
use crate::domain::ports::Probe;
use crate::utils::error::{ProbeError, Result};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use url::Url;

/// Which S3 dialect the endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum S3Flavor {
    /// MinIO: path-style addressing, always.
    PathStyle,
    /// AWS or compatible: addressing style from `use_path_style`.
    AwsCompatible,
}

impl S3Flavor {
    pub fn label(&self) -> &'static str {
        match self {
            Self::PathStyle => "minio",
            Self::AwsCompatible => "s3",
        }
    }
}

pub struct S3Probe {
    config: StorageConfig,
    flavor: S3Flavor,
    deadline: Deadline,
}

impl S3Probe {
    pub fn new(config: StorageConfig, flavor: S3Flavor, policy: DeadlinePolicy) -> Self {
        let deadline = Deadline::from_secs(config.timeout, policy);
        Self {
            config,
            flavor,
            deadline,
        }
    }

    fn context(&self, step: &str) -> String {
        format!("{} {}", self.flavor.label(), step)
    }

    fn force_path_style(&self) -> bool {
        match self.flavor {
            S3Flavor::PathStyle => true,
            S3Flavor::AwsCompatible => self.config.use_path_style,
        }
    }

    /// Builds a fresh client with static credentials and the normalized endpoint.
    pub async fn client(&self) -> Result<S3Client> {
        let endpoint = normalize_endpoint(&self.config.endpoint, self.config.secure);
        Url::parse(&endpoint).map_err(|e| ProbeError::connection(self.context("config"), e))?;
        tracing::debug!(
            "{} client: endpoint={}, region={}, path_style={}",
            self.flavor.label(),
            endpoint,
            self.config.region,
            self.force_path_style()
        );

        let credentials = Credentials::new(
            self.config.access_key.clone(),
            self.config.secret_key.clone(),
            None,
            None,
            "middleware-probe",
        );
        let timeout = self.deadline.timeout();
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(timeout)
                    .operation_timeout(timeout)
                    .build(),
            )
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(self.force_path_style())
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();
        Ok(S3Client::from_conf(s3_config))
    }

    async fn head_bucket(&self, client: &S3Client) -> Result<()> {
        let bucket = self.config.bucket.as_str();
        let outcome = self
            .deadline
            .scoped("bucket check", async {
                Ok(client.head_bucket().bucket(bucket).send().await)
            })
            .await?;

        match outcome {
            Ok(_) => Ok(()),
            Err(e) if e.as_service_error().map(|se| se.is_not_found()).unwrap_or(false) => {
                tracing::debug!("{} bucket {} not found", self.flavor.label(), bucket);
                Err(ProbeError::BucketMissing(bucket.to_string()))
            }
            Err(e) => {
                let step = match self.flavor {
                    S3Flavor::PathStyle => "connect",
                    S3Flavor::AwsCompatible => "bucket",
                };
                Err(ProbeError::connection(self.context(step), DisplayErrorContext(&e)))
            }
        }
    }
}

#[async_trait]
impl Probe for S3Probe {
    fn family(&self) -> BackendFamily {
        BackendFamily::Storage
    }

    fn variant(&self) -> &str {
        self.flavor.label()
    }

    fn handle_policy(&self) -> HandlePolicy {
        HandlePolicy::PerPhaseHandle
    }

    async fn connect(&mut self) -> PhaseOutcome {
        let client = self.client().await?;
        self.head_bucket(&client).await?;
        tracing::debug!("{} connect success", self.flavor.label());
        Ok(Completion::Done)
    }

    async fn write(&mut self) -> PhaseOutcome {
        let client = self.client().await?;
        let context = self.context("upload");
        self.deadline
            .scoped("upload", async {
                client
                    .put_object()
                    .bucket(&self.config.bucket)
                    .key(TEST_OBJECT)
                    .content_type("text/plain")
                    .body(ByteStream::from_static(TEST_CONTENT.as_bytes()))
                    .send()
                    .await
                    .map_err(|e| ProbeError::operation(context.as_str(), DisplayErrorContext(&e)))
            })
            .await?;
        tracing::debug!("{} upload success", self.flavor.label());
        Ok(Completion::Done)
    }

    async fn delete(&mut self) -> PhaseOutcome {
        let client = self.client().await?;
        let context = self.context("delete");
        self.deadline
            .scoped("delete", async {
                client
                    .delete_object()
                    .bucket(&self.config.bucket)
                    .key(TEST_OBJECT)
                    .send()
                    .await
                    .map_err(|e| ProbeError::operation(context.as_str(), DisplayErrorContext(&e)))
            })
            .await?;
        tracing::debug!("{} delete success", self.flavor.label());
        Ok(Completion::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minio_always_uses_path_style() {
        let probe = S3Probe::new(
            StorageConfig {
                use_path_style: false,
                ..StorageConfig::default()
            },
            S3Flavor::PathStyle,
            DeadlinePolicy::Explicit,
        );
        assert!(probe.force_path_style());
        assert_eq!(probe.context("upload"), "minio upload");
    }

    #[test]
    fn test_s3_path_style_follows_config() {
        let probe = S3Probe::new(
            StorageConfig {
                provider: "s3".to_string(),
                use_path_style: false,
                ..StorageConfig::default()
            },
            S3Flavor::AwsCompatible,
            DeadlinePolicy::Explicit,
        );
        assert!(!probe.force_path_style());
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_a_config_error() {
        let mut probe = S3Probe::new(
            StorageConfig {
                provider: "s3".to_string(),
                endpoint: "http://exa mple:9000".to_string(),
                bucket: "data".to_string(),
                ..StorageConfig::default()
            },
            S3Flavor::AwsCompatible,
            DeadlinePolicy::Explicit,
        );
        let err = probe.connect().await.unwrap_err();
        assert!(err.to_string().starts_with("s3 config error:"), "{}", err);
    }
}
