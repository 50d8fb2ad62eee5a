use dg_core::Command;

use super::EngineState;

/// Notification for one executed command. `command` has already been through
/// variable substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEvent {
    pub sequence: u64,
    pub chat: String,
    pub command: Command,
}

/// Receiver of engine notifications. Handlers run synchronously on the
/// engine's thread; the next command starts only after every subscriber has
/// returned.
pub trait ChatSubscriber {
    fn on_event(&mut self, event: &ChatEvent);

    /// The named chat ran out of commands or was left through a jump.
    fn on_chat_end(&mut self, _chat: &str) {}

    fn on_state_change(&mut self, _from: EngineState, _to: EngineState) {}
}

impl<F> ChatSubscriber for F
where
    F: FnMut(&ChatEvent),
{
    fn on_event(&mut self, event: &ChatEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Ordered subscriber list, first registered is first notified.
#[derive(Default)]
pub(super) struct SubscriberRegistry {
    entries: Vec<(SubscriberId, Box<dyn ChatSubscriber>)>,
    next_id: u64,
}

impl SubscriberRegistry {
    pub(super) fn add(&mut self, subscriber: Box<dyn ChatSubscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, subscriber));
        id
    }

    pub(super) fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn publish(&mut self, event: &ChatEvent) {
        for (_, subscriber) in &mut self.entries {
            subscriber.on_event(event);
        }
    }

    pub(super) fn chat_ended(&mut self, chat: &str) {
        for (_, subscriber) in &mut self.entries {
            subscriber.on_chat_end(chat);
        }
    }

    pub(super) fn state_changed(&mut self, from: EngineState, to: EngineState) {
        for (_, subscriber) in &mut self.entries {
            subscriber.on_state_change(from, to);
        }
    }
}
