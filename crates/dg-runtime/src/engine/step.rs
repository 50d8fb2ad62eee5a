use std::time::Duration;

use dg_core::{AskOption, Command, DialogicError};

use super::events::ChatEvent;
use super::lifecycle::{Cursor, DialogEngine, EngineState, PendingChoice};
use crate::store::VariableStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    AwaitingChoice,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed,
    AwaitingChoice(PendingChoice),
    /// The cancel gate was closed between two commands.
    Halted,
}

impl DialogEngine {
    /// Executes exactly one command of the active chat.
    pub fn step(&mut self) -> Result<StepOutcome, DialogicError> {
        match self.state {
            EngineState::Idle => {
                return Err(DialogicError::new(
                    "ENGINE_NOT_STARTED",
                    "Call run, run_chat or jump before stepping.",
                ))
            }
            EngineState::Completed => return Ok(StepOutcome::Completed),
            EngineState::AwaitingChoice => return Ok(StepOutcome::AwaitingChoice),
            EngineState::Halted => self.set_state(EngineState::Running),
            EngineState::Running | EngineState::Suspended => {}
        }

        let Some(cursor) = self.cursor else {
            self.set_state(EngineState::Completed);
            return Ok(StepOutcome::Completed);
        };

        let block = &self.dialog.chats[cursor.chat];
        if cursor.next >= block.end {
            let name = block.name.clone();
            self.subscribers.chat_ended(&name);
            self.cursor = None;
            self.set_state(EngineState::Completed);
            return Ok(StepOutcome::Completed);
        }

        let command = self.dialog.events[cursor.next].clone();
        self.cursor = Some(Cursor {
            next: cursor.next + 1,
            ..cursor
        });
        self.execute(command)
    }

    /// Runs until the chat completes, an Ask is raised or the gate closes.
    /// At most `max_steps` commands execute per call.
    pub(super) fn drive(&mut self) -> Result<RunOutcome, DialogicError> {
        let mut executed = 0usize;
        loop {
            if !self.gate.is_open() {
                self.set_state(EngineState::Halted);
                return Ok(RunOutcome::Halted);
            }
            if executed == self.max_steps && self.has_next_command() {
                self.abort_run();
                return Err(DialogicError::new(
                    "ENGINE_STEP_LIMIT",
                    format!("Run exceeded {} commands; check for Goto cycles.", self.max_steps),
                ));
            }
            match self.step()? {
                StepOutcome::Continue => executed += 1,
                StepOutcome::AwaitingChoice => return Ok(self.awaiting_outcome()),
                StepOutcome::Completed => return Ok(RunOutcome::Completed),
            }
        }
    }

    fn has_next_command(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor.next < self.dialog.chats[cursor.chat].end)
    }

    /// Moves the cursor to the start of a chat and announces it. Leaving the
    /// previous chat is announced first.
    pub(super) fn enter_chat(&mut self, index: usize) {
        if let Some(previous) = self.cursor {
            let name = self.dialog.chats[previous.chat].name.clone();
            self.subscribers.chat_ended(&name);
        }

        let block = &self.dialog.chats[index];
        let marker = block.marker;
        self.cursor = Some(Cursor {
            chat: index,
            next: block.body_start,
        });
        if let Some(marker) = marker {
            let command = self.dialog.events[marker].clone();
            self.fire(&command);
        }
    }

    fn execute(&mut self, command: Command) -> Result<StepOutcome, DialogicError> {
        match command {
            Command::NoOp => {}
            Command::Wait { millis } => {
                self.fire(&command);
                self.set_state(EngineState::Suspended);
                self.sleeper.sleep(Duration::from_millis(millis));
                self.set_state(EngineState::Running);
            }
            Command::Ask { .. } => {
                if let Command::Ask { prompt, options } = self.fire(&command) {
                    self.pending = Some(PendingChoice {
                        chat: self.current_chat().unwrap_or_default().to_string(),
                        prompt,
                        options,
                    });
                }
                self.set_state(EngineState::AwaitingChoice);
                return Ok(StepOutcome::AwaitingChoice);
            }
            Command::Gotu { ref target } => {
                self.fire(&command);
                tracing::debug!(%target, "goto");
                match self.chat_index(target) {
                    Ok(index) => self.enter_chat(index),
                    Err(error) => {
                        self.abort_run();
                        return Err(error);
                    }
                }
            }
            Command::Set {
                ref name,
                ref value,
            } => {
                self.fire(&command);
                self.globals.set(name.clone(), value.clone());
            }
            Command::Say { .. } | Command::Do { .. } | Command::Chat { .. } => {
                self.fire(&command);
            }
        }
        Ok(StepOutcome::Continue)
    }

    /// Substitutes, logs and publishes one command. Returns the substituted
    /// command.
    fn fire(&mut self, command: &Command) -> Command {
        let rendered = substitute_command(command, &self.globals);
        if let Some(log) = self.log.as_mut() {
            log.record(&rendered);
        }
        self.sequence += 1;
        let event = ChatEvent {
            sequence: self.sequence,
            chat: self.current_chat().unwrap_or_default().to_string(),
            command: rendered,
        };
        self.subscribers.publish(&event);
        event.command
    }
}

fn substitute_command(command: &Command, globals: &VariableStore) -> Command {
    match command {
        Command::Say { text } => Command::Say {
            text: globals.substitute(text).into_owned(),
        },
        Command::Do { action } => Command::Do {
            action: globals.substitute(action).into_owned(),
        },
        Command::Ask { prompt, options } => Command::Ask {
            prompt: globals.substitute(prompt).into_owned(),
            options: options
                .iter()
                .map(|option| AskOption {
                    label: globals.substitute(&option.label).into_owned(),
                    target: option.target.clone(),
                })
                .collect(),
        },
        other => other.clone(),
    }
}
