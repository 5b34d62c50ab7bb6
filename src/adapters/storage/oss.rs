//! Aliyun OSS through its S3-compatible API.
//!
//! Connect looks up [`PROBE_META_KEY`]: found and not-found both count as
//! reachable, any other answer fails the phase.

use crate::adapters::storage::{trim_protocol, TEST_CONTENT, TEST_OBJECT};
use crate::config::StorageConfig;
use crate::core::deadline::{Deadline, DeadlinePolicy};
use crate::domain::model::{BackendFamily, Completion, HandlePolicy, PhaseOutcome};
use crate::domain::ports::Probe;
use crate::utils::error::{ProbeError, Result};
use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{ClientOptions, ObjectStore, PutPayload, RetryConfig};

/// Key that is looked up, never written.
pub const PROBE_META_KEY: &str = "not_exist_key";

pub struct OssProbe {
    config: StorageConfig,
    deadline: Deadline,
}

impl OssProbe {
    pub fn new(config: StorageConfig, policy: DeadlinePolicy) -> Self {
        let deadline = Deadline::from_secs(config.timeout, policy);
        Self { config, deadline }
    }

    /// Virtual-hosted requests carry the bucket in the host name.
    pub fn endpoint(&self) -> String {
        let scheme = if self.config.secure { "https" } else { "http" };
        let host = trim_protocol(&self.config.endpoint);
        if self.config.use_path_style {
            format!("{}://{}", scheme, host)
        } else {
            format!("{}://{}.{}", scheme, self.config.bucket, host)
        }
    }

    fn store(&self) -> Result<AmazonS3> {
        let endpoint = self.endpoint();
        tracing::debug!("OSS client: endpoint={}, bucket={}", endpoint, self.config.bucket);

        let timeout = self.deadline.timeout();
        AmazonS3Builder::new()
            .with_endpoint(endpoint)
            .with_bucket_name(&self.config.bucket)
            .with_region(&self.config.region)
            .with_access_key_id(&self.config.access_key)
            .with_secret_access_key(&self.config.secret_key)
            .with_virtual_hosted_style_request(!self.config.use_path_style)
            .with_allow_http(!self.config.secure)
            .with_retry(RetryConfig {
                max_retries: 0,
                retry_timeout: timeout,
                ..RetryConfig::default()
            })
            .with_client_options(
                ClientOptions::new()
                    .with_timeout(timeout)
                    .with_connect_timeout(timeout),
            )
            .build()
            .map_err(|e| ProbeError::connection("oss connect", e))
    }
}

#[async_trait]
impl Probe for OssProbe {
    fn family(&self) -> BackendFamily {
        BackendFamily::Storage
    }

    fn variant(&self) -> &str {
        "oss"
    }

    fn handle_policy(&self) -> HandlePolicy {
        HandlePolicy::PerPhaseHandle
    }

    async fn connect(&mut self) -> PhaseOutcome {
        let store = self.store()?;
        let location = ObjectPath::from(PROBE_META_KEY);
        let head = self
            .deadline
            .scoped("bucket check", async { Ok(store.head(&location).await) })
            .await?;

        match head {
            Ok(_) => tracing::debug!("OSS bucket {} reachable", self.config.bucket),
            Err(object_store::Error::NotFound { .. }) => {
                tracing::debug!("OSS bucket {} reachable ({} absent)", self.config.bucket, PROBE_META_KEY)
            }
            Err(e) => return Err(ProbeError::connection("oss bucket", e)),
        }
        Ok(Completion::Done)
    }

    async fn write(&mut self) -> PhaseOutcome {
        let store = self.store()?;
        let location = ObjectPath::from(TEST_OBJECT);
        let put = self
            .deadline
            .scoped("upload", async {
                store
                    .put(&location, PutPayload::from_static(TEST_CONTENT.as_bytes()))
                    .await
                    .map_err(|e| ProbeError::operation("oss upload", e))
            })
            .await?;
        tracing::debug!("OSS upload success: etag={:?}", put.e_tag);
        Ok(Completion::Done)
    }

    async fn delete(&mut self) -> PhaseOutcome {
        let store = self.store()?;
        let location = ObjectPath::from(TEST_OBJECT);
        self.deadline
            .scoped("delete", async {
                store
                    .delete(&location)
                    .await
                    .map_err(|e| ProbeError::operation("oss delete", e))
            })
            .await?;
        tracing::debug!("OSS delete success");
        Ok(Completion::Done)
    }
}
