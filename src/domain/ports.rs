use crate::domain::model::{BackendFamily, HandlePolicy, PhaseOutcome};
use async_trait::async_trait;

/// One backend variant driven through connect, write and delete.
///
/// Phases are called in order by the sequencer and only after the previous
/// one succeeded. `release` is always called last, whatever happened, so a
/// [`HandlePolicy::SharedHandle`] adapter can close what connect opened.
#[async_trait]
pub trait Probe: Send {
    fn family(&self) -> BackendFamily;

    /// Provider or dialect name used in logs.
    fn variant(&self) -> &str;

    fn handle_policy(&self) -> HandlePolicy;

    async fn connect(&mut self) -> PhaseOutcome;

    async fn write(&mut self) -> PhaseOutcome;

    async fn delete(&mut self) -> PhaseOutcome;

    async fn release(&mut self) {}
}

#[async_trait]
impl<P: Probe + ?Sized> Probe for Box<P> {
    fn family(&self) -> BackendFamily {
        (**self).family()
    }

    fn variant(&self) -> &str {
        (**self).variant()
    }

    fn handle_policy(&self) -> HandlePolicy {
        (**self).handle_policy()
    }

    async fn connect(&mut self) -> PhaseOutcome {
        (**self).connect().await
    }

    async fn write(&mut self) -> PhaseOutcome {
        (**self).write().await
    }

    async fn delete(&mut self) -> PhaseOutcome {
        (**self).delete().await
    }

    async fn release(&mut self) {
        (**self).release().await
    }
}
