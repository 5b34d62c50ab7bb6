pub mod deadline;
pub mod engine;
pub mod sequencer;

pub use deadline::{Deadline, DeadlinePolicy};
pub use engine::{ProbeEngine, ProbeTarget};
pub use sequencer::{ProbeSequencer, SequencePlan};
