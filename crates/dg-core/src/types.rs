use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn synthetic() -> Self {
        Self {
            start: SourceLocation { line: 1, column: 1 },
            end: SourceLocation { line: 1, column: 1 },
        }
    }

    pub fn line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start: SourceLocation {
                line,
                column: start_column,
            },
            end: SourceLocation {
                line,
                column: end_column,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskOption {
    pub label: String,
    pub target: Option<String>,
}

impl AskOption {
    pub fn new(label: impl Into<String>, target: Option<String>) -> Self {
        Self {
            label: label.into(),
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Command {
    Say {
        text: String,
    },
    Wait {
        millis: u64,
    },
    Do {
        action: String,
    },
    Chat {
        name: String,
    },
    Ask {
        prompt: String,
        options: Vec<AskOption>,
    },
    Gotu {
        target: String,
    },
    Set {
        name: String,
        value: Value,
    },
    NoOp,
}

/// Discriminant of [`Command`], used for "most recent command of this kind"
/// queries without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Say,
    Wait,
    Do,
    Chat,
    Ask,
    Gotu,
    Set,
    NoOp,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Say { .. } => CommandKind::Say,
            Self::Wait { .. } => CommandKind::Wait,
            Self::Do { .. } => CommandKind::Do,
            Self::Chat { .. } => CommandKind::Chat,
            Self::Ask { .. } => CommandKind::Ask,
            Self::Gotu { .. } => CommandKind::Gotu,
            Self::Set { .. } => CommandKind::Set,
            Self::NoOp => CommandKind::NoOp,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Say => "Say",
            Self::Wait => "Wait",
            Self::Do => "Do",
            Self::Chat => "Chat",
            Self::Ask => "Ask",
            Self::Gotu => "Gotu",
            Self::Set => "Set",
            Self::NoOp => "NoOp",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Say { text } => write!(f, "Say: {}", text),
            Self::Wait { millis } => write!(f, "Wait: {}", millis),
            Self::Do { action } => write!(f, "Do: {}", action),
            Self::Chat { name } => write!(f, "Chat: {}", name),
            Self::Ask { prompt, options } => {
                write!(f, "Ask: {} [", prompt)?;
                for (index, option) in options.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    match &option.target {
                        Some(target) => write!(f, "{} -> {}", option.label, target)?,
                        None => f.write_str(&option.label)?,
                    }
                }
                f.write_str("]")
            }
            Self::Gotu { target } => write!(f, "Gotu: {}", target),
            Self::Set { name, value } => write!(f, "Set: {}={}", name, value),
            Self::NoOp => f.write_str("NoOp"),
        }
    }
}

/// Index-based view of one chat inside [`Dialog::events`].
///
/// `marker` is the position of the `Chat` command, absent for the anonymous
/// block holding statements that precede the first marker. The chat's own
/// commands are `events[body_start..end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBlock {
    pub name: String,
    pub marker: Option<usize>,
    pub body_start: usize,
    pub end: usize,
}

impl ChatBlock {
    pub fn is_anonymous(&self) -> bool {
        self.marker.is_none()
    }

    pub fn len(&self) -> usize {
        self.end - self.body_start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dialog {
    pub events: Vec<Command>,
    pub chats: Vec<ChatBlock>,
}

impl Dialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command and keeps the chat groupings in step. Returns the
    /// command's creation index.
    pub fn add_event(&mut self, command: Command) -> usize {
        let index = self.events.len();
        if let Command::Chat { name } = &command {
            self.chats.push(ChatBlock {
                name: name.clone(),
                marker: Some(index),
                body_start: index + 1,
                end: index + 1,
            });
        } else {
            match self.chats.last_mut() {
                Some(block) => block.end = index + 1,
                None => self.chats.push(ChatBlock {
                    name: String::new(),
                    marker: None,
                    body_start: index,
                    end: index + 1,
                }),
            }
        }
        self.events.push(command);
        index
    }

    /// Reverse scan by creation order for the newest command of `kind`.
    pub fn last_index_of(&self, kind: CommandKind) -> Option<usize> {
        self.events
            .iter()
            .rposition(|command| command.kind() == kind)
    }

    pub fn event_mut(&mut self, index: usize) -> Option<&mut Command> {
        self.events.get_mut(index)
    }

    /// Linear scan for a named chat; the anonymous leading block is never a
    /// match.
    pub fn chat_index(&self, name: &str) -> Option<usize> {
        self.chats
            .iter()
            .position(|block| !block.is_anonymous() && block.name == name)
    }

    pub fn chat(&self, name: &str) -> Option<&ChatBlock> {
        self.chat_index(name).map(|index| &self.chats[index])
    }

    pub fn commands(&self, block: &ChatBlock) -> &[Command] {
        &self.events[block.body_start..block.end]
    }

    pub fn chat_names(&self) -> Vec<&str> {
        self.chats
            .iter()
            .filter(|block| !block.is_anonymous())
            .map(|block| block.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn say(text: &str) -> Command {
        Command::Say {
            text: text.to_string(),
        }
    }

    fn chat(name: &str) -> Command {
        Command::Chat {
            name: name.to_string(),
        }
    }

    #[test]
    fn add_event_groups_commands_under_latest_chat() {
        let mut dialog = Dialog::new();
        dialog.add_event(chat("intro"));
        dialog.add_event(say("a"));
        dialog.add_event(say("b"));
        dialog.add_event(chat("middle"));
        dialog.add_event(say("c"));

        assert_eq!(dialog.events.len(), 5);
        assert_eq!(dialog.chat_names(), vec!["intro", "middle"]);
        let intro = dialog.chat("intro").expect("intro");
        assert_eq!(dialog.commands(intro), &[say("a"), say("b")]);
        let middle = dialog.chat("middle").expect("middle");
        assert_eq!(middle.marker, Some(3));
        assert_eq!(dialog.commands(middle), &[say("c")]);
    }

    #[test]
    fn leading_commands_form_anonymous_block() {
        let mut dialog = Dialog::new();
        dialog.add_event(say("before"));
        dialog.add_event(chat("intro"));

        assert!(dialog.chats[0].is_anonymous());
        assert_eq!(dialog.commands(&dialog.chats[0]), &[say("before")]);
        assert_eq!(dialog.chat_index(""), None);
        assert_eq!(dialog.chat_index("intro"), Some(1));
    }

    #[test]
    fn empty_chat_has_no_commands() {
        let mut dialog = Dialog::new();
        dialog.add_event(chat("empty"));
        let block = dialog.chat("empty").expect("empty chat");
        assert!(block.is_empty());
    }

    #[test]
    fn last_index_of_scans_backwards() {
        let mut dialog = Dialog::new();
        dialog.add_event(Command::Ask {
            prompt: "first".to_string(),
            options: Vec::new(),
        });
        dialog.add_event(say("x"));
        dialog.add_event(Command::Ask {
            prompt: "second".to_string(),
            options: Vec::new(),
        });
        dialog.add_event(say("y"));
        assert_eq!(dialog.last_index_of(CommandKind::Ask), Some(2));
        assert_eq!(dialog.last_index_of(CommandKind::Gotu), None);
    }

    #[test]
    fn display_renders_printable_form() {
        let ask = Command::Ask {
            prompt: "Pick one".to_string(),
            options: vec![
                AskOption::new("A", None),
                AskOption::new("B", Some("other".to_string())),
            ],
        };
        assert_eq!(ask.to_string(), "Ask: Pick one [A, B -> other]");
        assert_eq!(Command::Wait { millis: 1000 }.to_string(), "Wait: 1000");
        assert_eq!(
            Command::Set {
                name: "n".to_string(),
                value: Value::Number(3.0)
            }
            .to_string(),
            "Set: n=3"
        );
    }

    #[test]
    fn command_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Command::Wait { millis: 5 }).expect("json");
        assert_eq!(json, r#"{"kind":"wait","millis":5}"#);
    }
}
