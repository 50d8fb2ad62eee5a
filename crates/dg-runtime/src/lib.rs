mod command_log;
mod engine;
mod store;

pub use command_log::{CommandLog, LOG_HEADER};
pub use engine::{
    CancelGate, ChatEvent, ChatSubscriber, DialogEngine, EngineOptions, EngineState,
    PendingChoice, RunOutcome, Sleeper, StepOutcome, SubscriberId, ThreadSleeper,
    DEFAULT_MAX_STEPS,
};
pub use store::{VariableStore, VARIABLE_SIGIL};
