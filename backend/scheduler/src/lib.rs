pub mod calls;
pub mod dispatch;
pub mod engine;
pub mod notice;
pub mod scheduler;
pub mod settings;
pub mod suspension;

// Engine operations, one module per trigger.
pub mod escalation;
pub mod reactions;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::Dispatcher;
pub use engine::Engine;
pub use escalation::SweepReport;
pub use reactions::Reaction;
pub use reconcile::ReconcileReport;
pub use scheduler::Scheduler;
pub use settings::{EngineSettings, HISTORY_PAGE_SIZE};
pub use suspension::{Suspension, SuspensionTier};
