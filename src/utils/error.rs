use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("unsupported provider")]
    UnsupportedProvider,

    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("{context} error: {message}")]
    Connection { context: String, message: String },

    #[error("{0} timeout")]
    Timeout(&'static str),

    #[error("{context} error: {message}")]
    Operation { context: String, message: String },

    #[error("Bucket not exists: {0}")]
    BucketMissing(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Dispatch,
    Connection,
    Timeout,
    Operation,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ProbeError {
    /// Dial, open, auth or ping failure. Renders as `"<context> error: <message>"`.
    pub fn connection(context: impl Into<String>, err: impl Display) -> Self {
        Self::Connection {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Failure of a statement or command on an established handle.
    pub fn operation(context: impl Into<String>, err: impl Display) -> Self {
        Self::Operation {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedProvider | Self::UnsupportedDriver(_) => ErrorCategory::Dispatch,
            Self::Connection { .. } | Self::BucketMissing(_) => ErrorCategory::Connection,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Operation { .. } => ErrorCategory::Operation,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Timeout => ErrorSeverity::Medium,
            ErrorCategory::Dispatch | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Connection | ErrorCategory::Operation => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Dispatch => "check the provider or driver name against the supported list",
            ErrorCategory::Connection => "check host, port, credentials and that the service is running",
            ErrorCategory::Timeout => "the backend did not answer in time; raise --timeout or check the network path",
            ErrorCategory::Operation => "check that the account has create/write/delete permissions",
            ErrorCategory::Configuration => "fix the reported configuration value and retry",
            ErrorCategory::System => "check file permissions and the configuration file format",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_scoped_messages() {
        assert_eq!(
            ProbeError::connection("ping", "connection refused").to_string(),
            "ping error: connection refused"
        );
        assert_eq!(ProbeError::Timeout("ping").to_string(), "ping timeout");
        assert_eq!(ProbeError::UnsupportedProvider.to_string(), "unsupported provider");
        assert_eq!(
            ProbeError::BucketMissing("data".to_string()).to_string(),
            "Bucket not exists: data"
        );
    }

    #[test]
    fn test_timeout_is_distinct_from_connection() {
        assert_eq!(ProbeError::Timeout("ping").category(), ErrorCategory::Timeout);
        assert_eq!(
            ProbeError::connection("open", "bad url").category(),
            ErrorCategory::Connection
        );
        assert!(ProbeError::IoError(std::io::Error::other("x")).severity() > ErrorSeverity::High);
    }
}
