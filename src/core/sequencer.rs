use crate::domain::model::{PhaseOutcome, PhaseResult, ProbeReport};
use crate::domain::ports::Probe;
use std::future::Future;
use std::time::Instant;

/// Knobs for the phase order that do not belong to any single adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequencePlan {
    /// Attempt one write before looking at the connect result. The attempt's
    /// outcome is logged and never reported; the reported write still only
    /// runs after a successful connect.
    pub eager_write: bool,
}

pub struct ProbeSequencer<P: Probe> {
    probe: P,
    plan: SequencePlan,
}

impl<P: Probe> ProbeSequencer<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            plan: SequencePlan::default(),
        }
    }

    pub fn with_plan(probe: P, plan: SequencePlan) -> Self {
        Self { probe, plan }
    }

    pub async fn run(mut self) -> ProbeReport {
        let family = self.probe.family();
        let variant = self.probe.variant().to_string();
        tracing::debug!(
            "Probing {} ({}), handle policy {:?}",
            family,
            variant,
            self.probe.handle_policy()
        );

        let mut report = ProbeReport::default();

        report.connect = timed("connect", self.probe.connect()).await;

        if self.plan.eager_write {
            let eager = timed("eager write", self.probe.write()).await;
            tracing::debug!("Eager write attempt (not reported): {:?}", eager);
        }

        if report.connect.is_success() {
            report.write = timed("write", self.probe.write()).await;
            if report.write.is_success() {
                report.delete = timed("delete", self.probe.delete()).await;
            }
        }

        self.probe.release().await;

        tracing::info!(
            "{} ({}) probe finished: connect={:?} write={:?} delete={:?}",
            family,
            variant,
            report.connect.status,
            report.write.status,
            report.delete.status
        );
        report
    }
}

async fn timed<F>(phase: &str, fut: F) -> PhaseResult
where
    F: Future<Output = PhaseOutcome>,
{
    let started = Instant::now();
    let result = PhaseResult::from(fut.await);
    tracing::debug!(
        "{} finished in {:?}: {:?} {}",
        phase,
        started.elapsed(),
        result.status,
        result.error.as_deref().unwrap_or("")
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BackendFamily, Completion, HandlePolicy, PhaseStatus};
    use crate::utils::error::ProbeError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy)]
    enum Step {
        Ok,
        Fail,
        NotApplicable,
    }

    struct ScriptedProbe {
        connect: Step,
        write: Step,
        delete: Step,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ScriptedProbe {
        fn new(connect: Step, write: Step, delete: Step) -> Self {
            Self {
                connect,
                write,
                delete,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn play(&self, name: &'static str, step: Step) -> PhaseOutcome {
            self.calls.lock().unwrap().push(name);
            match step {
                Step::Ok => Ok(Completion::Done),
                Step::NotApplicable => Ok(Completion::NotApplicable),
                Step::Fail => Err(ProbeError::connection(name, "boom")),
            }
        }
    }

    #[async_trait]
    impl Probe for ScriptedProbe {
        fn family(&self) -> BackendFamily {
            BackendFamily::Cache
        }

        fn variant(&self) -> &str {
            "scripted"
        }

        fn handle_policy(&self) -> HandlePolicy {
            HandlePolicy::PerPhaseHandle
        }

        async fn connect(&mut self) -> PhaseOutcome {
            self.play("connect", self.connect)
        }

        async fn write(&mut self) -> PhaseOutcome {
            self.play("write", self.write)
        }

        async fn delete(&mut self) -> PhaseOutcome {
            self.play("delete", self.delete)
        }

        async fn release(&mut self) {
            self.calls.lock().unwrap().push("release");
        }
    }

    #[tokio::test]
    async fn test_all_phases_succeed() {
        let probe = ScriptedProbe::new(Step::Ok, Step::Ok, Step::Ok);
        let calls = probe.calls.clone();

        let report = ProbeSequencer::new(probe).run().await;

        assert!(report.is_healthy());
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["connect", "write", "delete", "release"]
        );
    }

    #[tokio::test]
    async fn test_connect_failure_skips_the_rest() {
        let probe = ScriptedProbe::new(Step::Fail, Step::Ok, Step::Ok);
        let calls = probe.calls.clone();

        let report = ProbeSequencer::new(probe).run().await;

        assert_eq!(report.connect.status, PhaseStatus::Failure);
        assert_eq!(report.connect.error.as_deref(), Some("connect error: boom"));
        assert_eq!(report.write, PhaseResult::skipped());
        assert_eq!(report.delete, PhaseResult::skipped());
        assert_eq!(*calls.lock().unwrap(), vec!["connect", "release"]);
    }

    #[tokio::test]
    async fn test_write_failure_skips_delete() {
        let probe = ScriptedProbe::new(Step::Ok, Step::Fail, Step::Ok);
        let report = ProbeSequencer::new(probe).run().await;

        assert_eq!(report.connect.status, PhaseStatus::Success);
        assert_eq!(report.write.status, PhaseStatus::Failure);
        assert_eq!(report.delete.status, PhaseStatus::Skipped);
    }

    #[tokio::test]
    async fn test_not_applicable_write_is_a_silent_skip() {
        let probe = ScriptedProbe::new(Step::Ok, Step::NotApplicable, Step::Ok);
        let calls = probe.calls.clone();

        let report = ProbeSequencer::new(probe).run().await;

        assert_eq!(report.write, PhaseResult::skipped());
        assert_eq!(report.delete, PhaseResult::skipped());
        assert!(!calls.lock().unwrap().contains(&"delete"));
    }

    #[tokio::test]
    async fn test_eager_write_runs_but_is_not_reported() {
        let probe = ScriptedProbe::new(Step::Fail, Step::Ok, Step::Ok);
        let calls = probe.calls.clone();

        let report =
            ProbeSequencer::with_plan(probe, SequencePlan { eager_write: true }).run().await;

        assert_eq!(*calls.lock().unwrap(), vec!["connect", "write", "release"]);
        assert_eq!(report.write.status, PhaseStatus::Skipped);
        assert_eq!(report.delete.status, PhaseStatus::Skipped);
    }

    #[tokio::test]
    async fn test_eager_write_then_guarded_write() {
        let probe = ScriptedProbe::new(Step::Ok, Step::Ok, Step::Ok);
        let calls = probe.calls.clone();

        let report =
            ProbeSequencer::with_plan(probe, SequencePlan { eager_write: true }).run().await;

        assert!(report.is_healthy());
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["connect", "write", "write", "delete", "release"]
        );
    }
}
