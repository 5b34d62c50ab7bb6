use crate::config::{CacheConfig, CacheMode, QueueConfig, RdbConfig, StorageConfig};
use crate::core::deadline::DeadlinePolicy;
use crate::core::engine::ProbeTarget;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "middleware-probe")]
#[command(about = "Connect, write and delete checks against middleware backends")]
pub struct ProbeCli {
    /// Debug-level logs on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Which waits are bounded by the probe timeout
    #[arg(long, value_enum, global = true, default_value_t = DeadlinePolicy::Explicit)]
    pub deadline: DeadlinePolicy,

    #[command(subcommand)]
    pub command: ProbeCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProbeCommand {
    /// Relational database (mysql, postgres, dm)
    Rdb(RdbArgs),
    /// Redis, Redis Sentinel or a Redis-compatible cache
    Cache(CacheArgs),
    /// Kafka or RabbitMQ
    Mq(MqArgs),
    /// MinIO, S3 or OSS object storage
    Storage(StorageArgs),
    /// Every backend listed in a TOML file
    File(FileArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RdbArgs {
    #[arg(short = 'D', long, default_value = "mysql")]
    pub driver: String,

    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short = 'P', long, default_value_t = 3306)]
    pub port: u16,

    #[arg(short = 'u', long, default_value = "root")]
    pub user: String,

    #[arg(short = 'p', long, default_value = "")]
    pub password: String,

    #[arg(short = 'd', long, default_value = "")]
    pub db: String,

    /// Seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

impl From<RdbArgs> for RdbConfig {
    fn from(args: RdbArgs) -> Self {
        Self {
            driver: args.driver,
            host: args.host,
            port: args.port,
            username: args.user,
            password: args.password,
            database: args.db,
            timeout: args.timeout,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(short = 'P', long, default_value_t = 6379)]
    pub port: u16,

    #[arg(short = 'p', long, default_value = "")]
    pub password: String,

    #[arg(short = 'd', long, default_value_t = 1)]
    pub db: i64,

    #[arg(short = 't', long, default_value_t = 10)]
    pub timeout: u64,

    #[arg(short = 'm', long, value_enum, default_value_t = CacheMode::Redis)]
    pub mode: CacheMode,

    /// Comma separated host:port list, sentinel mode only
    #[arg(short = 's', long, value_delimiter = ',')]
    pub sentinels: Vec<String>,

    #[arg(short = 'M', long, default_value = "mymaster")]
    pub master: String,
}

impl From<CacheArgs> for CacheConfig {
    fn from(args: CacheArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            password: args.password,
            db: args.db,
            mode: args.mode,
            sentinels: args.sentinels,
            master: args.master,
            timeout: args.timeout,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct MqArgs {
    /// kafka, rabbitmq (or mq)
    #[arg(short = 't', long, default_value = "rabbitmq")]
    pub provider: String,

    /// Comma separated Kafka brokers
    #[arg(long, value_delimiter = ',')]
    pub brokers: Vec<String>,

    #[arg(long, default_value = "laiye_cloud")]
    pub topic: String,

    #[arg(short = 'H', long, default_value = "")]
    pub host: String,

    #[arg(short = 'P', long, default_value_t = 5672)]
    pub port: u16,

    #[arg(short = 'u', long, default_value = "")]
    pub user: String,

    #[arg(short = 'p', long, default_value = "")]
    pub password: String,

    #[arg(short = 'v', long, default_value = "laiye_cloud")]
    pub vhost: String,

    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Attempt a write before the connect result is known
    #[arg(long)]
    pub legacy_eager_write: bool,
}

impl From<MqArgs> for QueueConfig {
    fn from(args: MqArgs) -> Self {
        Self {
            provider: args.provider,
            brokers: args.brokers,
            topic: args.topic,
            host: args.host,
            port: args.port,
            user: args.user,
            password: args.password,
            vhost: args.vhost,
            timeout: args.timeout,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StorageArgs {
    /// minio, oss or s3
    #[arg(short = 't', long, default_value = "minio")]
    pub provider: String,

    #[arg(short = 'H', long, default_value = "127.0.0.1:9000")]
    pub endpoint: String,

    #[arg(short = 'u', long, default_value = "laiyelaiye")]
    pub access_key: String,

    #[arg(short = 'p', long, default_value = "")]
    pub secret_key: String,

    #[arg(short = 'b', long, default_value = "")]
    pub bucket: String,

    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// Use https
    #[arg(long)]
    pub secure: bool,

    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    #[arg(long)]
    pub use_path_style: bool,

    /// Attempt a write before the connect result is known
    #[arg(long)]
    pub legacy_eager_write: bool,
}

impl From<StorageArgs> for StorageConfig {
    fn from(args: StorageArgs) -> Self {
        Self {
            provider: args.provider,
            endpoint: args.endpoint,
            access_key: args.access_key,
            secret_key: args.secret_key,
            bucket: args.bucket,
            region: args.region,
            secure: args.secure,
            use_path_style: args.use_path_style,
            timeout: args.timeout,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    #[arg(short = 'c', long, default_value = "probes.toml")]
    pub config: PathBuf,
}

impl ProbeCommand {
    /// The single target and its eager-write flag; `None` for `file`.
    pub fn into_target(self) -> Option<(ProbeTarget, bool)> {
        match self {
            Self::Rdb(args) => Some((ProbeTarget::Rdb(args.into()), false)),
            Self::Cache(args) => Some((ProbeTarget::Cache(args.into()), false)),
            Self::Mq(args) => {
                let eager = args.legacy_eager_write;
                Some((ProbeTarget::Mq(args.into()), eager))
            }
            Self::Storage(args) => {
                let eager = args.legacy_eager_write;
                Some((ProbeTarget::Storage(args.into()), eager))
            }
            Self::File(_) => None,
        }
    }
}
