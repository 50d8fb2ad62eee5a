mod events;
mod lifecycle;
mod pacing;
mod step;

pub use events::{ChatEvent, ChatSubscriber, SubscriberId};
pub use lifecycle::{DialogEngine, EngineOptions, EngineState, PendingChoice, DEFAULT_MAX_STEPS};
pub use pacing::{CancelGate, Sleeper, ThreadSleeper};
pub use step::{RunOutcome, StepOutcome};
