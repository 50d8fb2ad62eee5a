use std::collections::BTreeMap;
use std::path::PathBuf;

use dg_core::{AskOption, ChatBlock, Dialog, DialogicError, Value};

use super::events::{ChatSubscriber, SubscriberId, SubscriberRegistry};
use super::pacing::{CancelGate, Sleeper, ThreadSleeper};
use super::step::RunOutcome;
use crate::command_log::CommandLog;
use crate::store::VariableStore;

pub const DEFAULT_MAX_STEPS: usize = 100_000;

#[derive(Default)]
pub struct EngineOptions {
    pub globals: BTreeMap<String, Value>,
    /// Command log destination; `None` disables logging.
    pub log_path: Option<PathBuf>,
    pub sleeper: Option<Box<dyn Sleeper>>,
    /// Upper bound on commands executed by one `run`/`resume`/`choose`/`jump`.
    pub max_steps: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Suspended,
    AwaitingChoice,
    Halted,
    Completed,
}

/// The prompt raised by an `Ask`, waiting for [`DialogEngine::choose`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChoice {
    pub chat: String,
    pub prompt: String,
    pub options: Vec<AskOption>,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Cursor {
    pub(super) chat: usize,
    pub(super) next: usize,
}

pub struct DialogEngine {
    pub(super) dialog: Dialog,
    pub(super) globals: VariableStore,
    pub(super) subscribers: SubscriberRegistry,
    pub(super) log: Option<CommandLog>,
    pub(super) sleeper: Box<dyn Sleeper>,
    pub(super) gate: CancelGate,
    pub(super) max_steps: usize,
    pub(super) state: EngineState,
    pub(super) cursor: Option<Cursor>,
    pub(super) pending: Option<PendingChoice>,
    pub(super) sequence: u64,
}

impl DialogEngine {
    pub fn new(dialog: Dialog, options: EngineOptions) -> Self {
        Self {
            dialog,
            globals: VariableStore::from(options.globals),
            subscribers: SubscriberRegistry::default(),
            log: options.log_path.map(CommandLog::create),
            sleeper: options.sleeper.unwrap_or_else(|| Box::new(ThreadSleeper)),
            gate: CancelGate::default(),
            max_steps: options.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
            state: EngineState::Idle,
            cursor: None,
            pending: None,
            sequence: 0,
        }
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn globals(&self) -> &VariableStore {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut VariableStore {
        &mut self.globals
    }

    pub fn command_log(&self) -> Option<&CommandLog> {
        self.log.as_ref()
    }

    pub fn cancel_gate(&self) -> CancelGate {
        self.gate.clone()
    }

    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.pending.as_ref()
    }

    /// Name of the chat the engine is positioned in, `""` for the anonymous
    /// leading block.
    pub fn current_chat(&self) -> Option<&str> {
        self.cursor
            .map(|cursor| self.dialog.chats[cursor.chat].name.as_str())
    }

    pub fn subscribe(&mut self, subscriber: impl ChatSubscriber + 'static) -> SubscriberId {
        self.subscribers.add(Box::new(subscriber))
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn find_chat(&self, name: &str) -> Result<&ChatBlock, DialogicError> {
        self.dialog
            .chat(name)
            .ok_or_else(|| DialogicError::chat_not_found(name))
    }

    /// Starts at the first chat of the dialog.
    pub fn run(&mut self) -> Result<RunOutcome, DialogicError> {
        if self.dialog.chats.is_empty() {
            return Err(DialogicError::new(
                "ENGINE_NO_CHATS",
                "Dialog contains no chats to run.",
            ));
        }
        self.start_at(0)
    }

    pub fn run_chat(&mut self, name: &str) -> Result<RunOutcome, DialogicError> {
        let index = self.chat_index(name)?;
        self.start_at(index)
    }

    /// External jump, e.g. after the presentation layer resolved an `Ask` on
    /// its own. Discards any pending choice.
    pub fn jump(&mut self, name: &str) -> Result<RunOutcome, DialogicError> {
        let index = self.chat_index(name)?;
        self.pending = None;
        self.set_state(EngineState::Running);
        self.enter_chat(index);
        self.drive()
    }

    /// Resolves the pending `Ask`. An option with a target jumps to that chat;
    /// one without continues after the `Ask`.
    pub fn choose(&mut self, index: usize) -> Result<RunOutcome, DialogicError> {
        let Some(pending) = self.pending.as_ref() else {
            return Err(DialogicError::new(
                "ENGINE_NO_PENDING_CHOICE",
                "No Ask is waiting for a choice.",
            ));
        };
        let Some(option) = pending.options.get(index) else {
            return Err(DialogicError::new(
                "ENGINE_CHOICE_OUT_OF_RANGE",
                format!(
                    "Choice {} is out of range for {} option(s).",
                    index,
                    pending.options.len()
                ),
            ));
        };

        let target = option.target.clone();
        self.pending = None;
        self.set_state(EngineState::Running);
        if let Some(target) = target {
            tracing::debug!(%target, "option jump");
            let chat = match self.chat_index(&target) {
                Ok(chat) => chat,
                Err(error) => {
                    self.abort_run();
                    return Err(error);
                }
            };
            self.enter_chat(chat);
        }
        self.drive()
    }

    /// Continues a run stopped by the cancel gate. The gate must be open
    /// again, otherwise the engine halts immediately.
    pub fn resume(&mut self) -> Result<RunOutcome, DialogicError> {
        match self.state {
            EngineState::Halted => {
                self.set_state(EngineState::Running);
                self.drive()
            }
            EngineState::AwaitingChoice => Ok(self.awaiting_outcome()),
            EngineState::Completed => Ok(RunOutcome::Completed),
            state => Err(DialogicError::new(
                "ENGINE_NOT_RESUMABLE",
                format!("Cannot resume from {:?}.", state),
            )),
        }
    }

    fn start_at(&mut self, index: usize) -> Result<RunOutcome, DialogicError> {
        self.pending = None;
        self.cursor = None;
        self.set_state(EngineState::Running);
        self.enter_chat(index);
        self.drive()
    }

    pub(super) fn chat_index(&self, name: &str) -> Result<usize, DialogicError> {
        self.dialog
            .chat_index(name)
            .ok_or_else(|| DialogicError::chat_not_found(name))
    }

    pub(super) fn set_state(&mut self, next: EngineState) {
        if self.state != next {
            let previous = self.state;
            self.state = next;
            self.subscribers.state_changed(previous, next);
        }
    }

    /// Leaves the engine re-runnable after a fatal execution error.
    pub(super) fn abort_run(&mut self) {
        self.cursor = None;
        self.pending = None;
        self.set_state(EngineState::Idle);
    }

    pub(super) fn awaiting_outcome(&self) -> RunOutcome {
        match &self.pending {
            Some(pending) => RunOutcome::AwaitingChoice(pending.clone()),
            None => RunOutcome::Completed,
        }
    }
}
