use crate::config::{CacheConfig, CacheMode};
use crate::core::deadline::{Deadline, DeadlinePolicy};
use crate::domain::model::{BackendFamily, Completion, HandlePolicy, PhaseOutcome};
use crate::domain::ports::Probe;
use crate::utils::error::{ProbeError, Result};
use crate::utils::logger::redact_url;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::sentinel::{SentinelClient, SentinelNodeConnectionInfo, SentinelServerType};
use redis::{AsyncCommands, RedisConnectionInfo};
use url::Url;

pub const TEST_KEY: &str = "precheck_test_key";
pub const TEST_VALUE: &str = "ok";
/// Leftovers expire on their own if delete never runs.
pub const TEST_TTL_SECS: u64 = 60;

/// Redis probe. Every phase dials its own connection and drops it on return.
pub struct CacheProbe {
    config: CacheConfig,
    deadline: Deadline,
}

impl CacheProbe {
    pub fn new(config: CacheConfig, policy: DeadlinePolicy) -> Self {
        let deadline = Deadline::from_secs(config.timeout, policy);
        Self { config, deadline }
    }

    /// `redis://[:password@]host:port/db` for plain and credis modes.
    pub fn single_url(&self) -> String {
        let base = format!("redis://{}:{}", self.config.host, self.config.port);
        let Ok(mut url) = Url::parse(&base) else {
            return base;
        };
        if !self.config.password.is_empty() {
            let _ = url.set_password(Some(&self.config.password));
        }
        url.set_path(&format!("/{}", self.config.db));
        url.to_string()
    }

    fn node_info(&self) -> RedisConnectionInfo {
        RedisConnectionInfo {
            db: self.config.db,
            password: (!self.config.password.is_empty()).then(|| self.config.password.clone()),
            ..Default::default()
        }
    }

    /// Dial failures are reported under `step`, the command that needed the connection.
    async fn open(&self, step: &'static str) -> Result<MultiplexedConnection> {
        let timeout = self.deadline.timeout();
        match self.config.mode {
            CacheMode::Redis | CacheMode::Credis => {
                let url = self.single_url();
                tracing::debug!(
                    "Cache client: mode={:?}, addr={}",
                    self.config.mode,
                    redact_url(&url)
                );
                let client = redis::Client::open(url.as_str())
                    .map_err(|e| ProbeError::connection("client", e))?;
                self.deadline
                    .scoped(step, async {
                        client
                            .get_multiplexed_async_connection_with_timeouts(timeout, timeout)
                            .await
                            .map_err(|e| ProbeError::connection(step, e))
                    })
                    .await
            }
            CacheMode::Sentinel => {
                tracing::debug!(
                    "Cache client: mode=sentinel, addrs={:?}, master={}, db={}",
                    self.config.sentinels,
                    self.config.master,
                    self.config.db
                );
                let sentinels: Vec<String> = self
                    .config
                    .sentinels
                    .iter()
                    .filter(|addr| !addr.trim().is_empty())
                    .map(|addr| format!("redis://{}", addr.trim()))
                    .collect();
                let node = SentinelNodeConnectionInfo {
                    redis_connection_info: Some(self.node_info()),
                    ..Default::default()
                };
                let mut client = SentinelClient::build(
                    sentinels,
                    self.config.master.clone(),
                    Some(node),
                    SentinelServerType::Master,
                )
                .map_err(|e| ProbeError::connection("client", e))?;
                self.deadline
                    .scoped(step, async {
                        client
                            .get_async_connection()
                            .await
                            .map_err(|e| ProbeError::connection(step, e))
                    })
                    .await
            }
        }
    }
}

#[async_trait]
impl Probe for CacheProbe {
    fn family(&self) -> BackendFamily {
        BackendFamily::Cache
    }

    fn variant(&self) -> &str {
        match self.config.mode {
            CacheMode::Redis => "redis",
            CacheMode::Sentinel => "sentinel",
            CacheMode::Credis => "credis",
        }
    }

    fn handle_policy(&self) -> HandlePolicy {
        HandlePolicy::PerPhaseHandle
    }

    async fn connect(&mut self) -> PhaseOutcome {
        let mut conn = self.open("ping").await?;
        tracing::debug!("Cache PING");
        let pong: String = self
            .deadline
            .scoped("ping", async {
                redis::cmd("PING")
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| ProbeError::connection("ping", e))
            })
            .await?;
        tracing::debug!("Cache ping answered {}", pong);
        Ok(Completion::Done)
    }

    async fn write(&mut self) -> PhaseOutcome {
        let mut conn = self.open("set").await?;
        tracing::debug!("Cache SET {} {} EX {}", TEST_KEY, TEST_VALUE, TEST_TTL_SECS);
        self.deadline
            .scoped("set", async {
                let reply: redis::RedisResult<()> = redis::cmd("SET")
                    .arg(TEST_KEY)
                    .arg(TEST_VALUE)
                    .arg("EX")
                    .arg(TEST_TTL_SECS)
                    .query_async(&mut conn)
                    .await;
                reply.map_err(|e| ProbeError::operation("set", e))
            })
            .await?;
        Ok(Completion::Done)
    }

    async fn delete(&mut self) -> PhaseOutcome {
        let mut conn = self.open("del").await?;
        tracing::debug!("Cache DEL {}", TEST_KEY);
        let removed: i64 = self
            .deadline
            .scoped("del", async {
                conn.del(TEST_KEY)
                    .await
                    .map_err(|e| ProbeError::operation("del", e))
            })
            .await?;
        tracing::debug!("Cache removed {} key(s)", removed);
        Ok(Completion::Done)
    }
}
