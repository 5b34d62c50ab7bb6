use crate::utils::error::ProbeError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    #[serde(rename = "true")]
    Success,
    #[serde(rename = "false")]
    Failure,
    #[serde(rename = "skip")]
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    #[serde(rename = "success")]
    pub status: PhaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhaseResult {
    pub fn success() -> Self {
        Self {
            status: PhaseStatus::Success,
            error: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            status: PhaseStatus::Skipped,
            error: None,
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            status: PhaseStatus::Failure,
            error: Some(diagnostic.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PhaseStatus::Success
    }
}

impl Default for PhaseResult {
    fn default() -> Self {
        Self::skipped()
    }
}

impl From<PhaseOutcome> for PhaseResult {
    fn from(outcome: PhaseOutcome) -> Self {
        match outcome {
            Ok(Completion::Done) => Self::success(),
            Ok(Completion::NotApplicable) => Self::skipped(),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// The serialized contract: exactly `connect`, `write` and `delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub connect: PhaseResult,
    pub write: PhaseResult,
    pub delete: PhaseResult,
}

impl ProbeReport {
    /// A report for a probe that never got to dial, e.g. invalid configuration.
    pub fn rejected(err: &ProbeError) -> Self {
        Self {
            connect: PhaseResult::failure(err.to_string()),
            ..Self::default()
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.connect.is_success() && self.write.is_success() && self.delete.is_success()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// What an adapter phase did when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    /// The variant has nothing to do for this phase (RDB with an unknown dialect).
    NotApplicable,
}

pub type PhaseOutcome = Result<Completion, ProbeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendFamily {
    Rdb,
    Cache,
    Mq,
    Storage,
}

impl BackendFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rdb => "rdb",
            Self::Cache => "cache",
            Self::Mq => "mq",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for BackendFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a connection handle lives relative to the three phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePolicy {
    /// Opened by connect, reused by write and delete, closed by release.
    SharedHandle,
    /// Every phase opens and closes its own client.
    PerPhaseHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_serialization() {
        let report = ProbeReport {
            connect: PhaseResult::failure("ping timeout"),
            ..ProbeReport::default()
        };

        let json = report.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"connect":{"success":"false","error":"ping timeout"},"write":{"success":"skip"},"delete":{"success":"skip"}}"#
        );
    }

    #[test]
    fn test_success_omits_error() {
        let value = serde_json::to_value(PhaseResult::success()).unwrap();
        assert_eq!(value, serde_json::json!({"success": "true"}));
    }

    #[test]
    fn test_outcome_conversion() {
        assert_eq!(
            PhaseResult::from(Ok(Completion::NotApplicable)),
            PhaseResult::skipped()
        );
        assert_eq!(
            PhaseResult::from(Err(ProbeError::UnsupportedProvider)),
            PhaseResult::failure("unsupported provider")
        );
    }

    #[test]
    fn test_rejected_report() {
        let err = ProbeError::MissingConfigError {
            field: "brokers".to_string(),
        };
        let report = ProbeReport::rejected(&err);
        assert_eq!(report.connect.status, PhaseStatus::Failure);
        assert_eq!(report.write.status, PhaseStatus::Skipped);
        assert_eq!(report.delete.status, PhaseStatus::Skipped);
        assert!(!report.is_healthy());
    }
}
