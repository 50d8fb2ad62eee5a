use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use dg_core::Command;
use dg_runtime::{ChatEvent, ChatSubscriber};
use serde::Serialize;

/// Writer shared between the console subscriber and the play loop.
pub(crate) type SharedOut = Rc<RefCell<Box<dyn Write>>>;

#[derive(Serialize)]
struct EventLine<'a> {
    sequence: u64,
    chat: &'a str,
    command: &'a Command,
}

/// Renders every fired command for a terminal, or as one JSON object per
/// line with `json`.
pub(crate) struct ConsolePrinter {
    pub(crate) out: SharedOut,
    pub(crate) json: bool,
}

impl ConsolePrinter {
    fn render(&self, event: &ChatEvent) -> String {
        if self.json {
            let line = EventLine {
                sequence: event.sequence,
                chat: &event.chat,
                command: &event.command,
            };
            let json = serde_json::to_string(&line).unwrap_or_else(|error| {
                tracing::warn!(sequence = event.sequence, %error, "event json failed");
                "null".to_string()
            });
            return format!("EVENT_JSON:{}", json);
        }

        match &event.command {
            Command::Chat { name } => format!("[chat] {}", name),
            Command::Say { text } => text.clone(),
            Command::Wait { millis } => format!("(waiting {}ms)", millis),
            Command::Do { action } => format!("<{}>", action),
            Command::Ask { prompt, options } => {
                let mut rendered = prompt.clone();
                for (index, option) in options.iter().enumerate() {
                    rendered.push_str(&format!("\n  [{}] {}", index, option.label));
                }
                rendered
            }
            Command::Gotu { target } => format!("-> {}", target),
            Command::Set { name, value } => format!("[set] {} = {}", name, value),
            Command::NoOp => String::new(),
        }
    }
}

impl ChatSubscriber for ConsolePrinter {
    fn on_event(&mut self, event: &ChatEvent) {
        let line = self.render(event);
        let mut out = self.out.borrow_mut();
        if writeln!(out, "{}", line).and_then(|_| out.flush()).is_err() {
            tracing::warn!(sequence = event.sequence, "console output failed");
        }
    }

    fn on_chat_end(&mut self, chat: &str) {
        tracing::debug!(%chat, "chat ended");
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::Buffer;
    use super::*;
    use dg_core::{AskOption, Value};

    fn printer(json: bool) -> (ConsolePrinter, Buffer) {
        let buffer = Buffer::default();
        let out: SharedOut = Rc::new(RefCell::new(Box::new(buffer.clone())));
        (ConsolePrinter { out, json }, buffer)
    }

    fn event(command: Command) -> ChatEvent {
        ChatEvent {
            sequence: 7,
            chat: "intro".to_string(),
            command,
        }
    }

    #[test]
    fn renders_ask_with_indexed_options() {
        let (mut printer, buffer) = printer(false);
        printer.on_event(&event(Command::Ask {
            prompt: "Pick one".to_string(),
            options: vec![AskOption::new("A", None), AskOption::new("B", None)],
        }));
        assert_eq!(buffer.text(), "Pick one\n  [0] A\n  [1] B\n");
    }

    #[test]
    fn renders_plain_commands() {
        let (mut printer, buffer) = printer(false);
        printer.on_event(&event(Command::Do {
            action: "HappyFlip".to_string(),
        }));
        printer.on_event(&event(Command::Wait { millis: 10 }));
        assert_eq!(buffer.text(), "<HappyFlip>\n(waiting 10ms)\n");
    }

    #[test]
    fn renders_json_lines() {
        let (mut printer, buffer) = printer(true);
        printer.on_event(&event(Command::Say {
            text: "Hi".to_string(),
        }));
        assert_eq!(
            buffer.text(),
            "EVENT_JSON:{\"sequence\":7,\"chat\":\"intro\",\"command\":{\"kind\":\"say\",\"text\":\"Hi\"}}\n"
        );
    }

    #[test]
    fn json_lines_stay_parseable_for_non_finite_numbers() {
        let (mut printer, buffer) = printer(true);
        printer.on_event(&event(Command::Set {
            name: "ratio".to_string(),
            value: Value::Number(f64::NAN),
        }));
        let text = buffer.text();
        let payload = text
            .trim_end()
            .strip_prefix("EVENT_JSON:")
            .expect("json prefix");
        let parsed: serde_json::Value = serde_json::from_str(payload).expect("payload is json");
        assert_eq!(parsed["command"]["kind"], "set");
        assert!(parsed["command"]["value"].is_null());
    }
}
