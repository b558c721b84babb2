// Use cases layer: shared session state, the feature scheduler and the feature loops.

pub mod context;
pub mod features;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::{SessionContext, SessionStatus, WorldState, WorldSummary};
pub use scheduler::{Feature, Scheduler, SchedulerHandle};
