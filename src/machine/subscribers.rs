//! Post-transition subscriber registry.
//!
//! Subscribers run after the state update, event-specific ones first and
//! wildcard ("all events") ones second, each channel in registration
//! order.

use crate::core::{Event, Hook};

/// Handle returned by `on`/`on_any`, used to unregister via `off`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Clone, Debug, PartialEq)]
enum Channel {
    Event(String),
    All,
}

struct Entry<D, E> {
    id: SubscriberId,
    channel: Channel,
    callback: Hook<D, E>,
}

pub(crate) struct SubscriberRegistry<D, E> {
    entries: Vec<Entry<D, E>>,
    next_id: u64,
}

impl<D: Send + Sync + 'static, E: Event> SubscriberRegistry<D, E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(&mut self, event: impl Into<String>, callback: Hook<D, E>) -> SubscriberId {
        self.push(Channel::Event(event.into()), callback)
    }

    pub fn subscribe_all(&mut self, callback: Hook<D, E>) -> SubscriberId {
        self.push(Channel::All, callback)
    }

    fn push(&mut self, channel: Channel, callback: Hook<D, E>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            channel,
            callback,
        });
        id
    }

    /// Remove a subscriber. Returns false when the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Callbacks subscribed to this specific event, in registration order.
    pub fn for_event(&self, event: &str) -> Vec<Hook<D, E>> {
        self.entries
            .iter()
            .filter(|entry| entry.channel == Channel::Event(event.to_string()))
            .map(|entry| entry.callback.clone())
            .collect()
    }

    /// Wildcard callbacks, in registration order.
    pub fn for_all(&self) -> Vec<Hook<D, E>> {
        self.entries
            .iter()
            .filter(|entry| entry.channel == Channel::All)
            .map(|entry| entry.callback.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Context;
    use futures::executor::block_on;
    use std::sync::{Arc, Mutex};

    fn logging_hook(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Hook<(), String> {
        let log = Arc::clone(log);
        Hook::new(move |_ctx, _event| log.lock().unwrap().push(tag))
    }

    #[test]
    fn event_channel_only_matches_its_event() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SubscriberRegistry::new();
        registry.subscribe("fetch", logging_hook(&log, "fetch"));
        registry.subscribe("reset", logging_hook(&log, "reset"));

        assert_eq!(registry.for_event("fetch").len(), 1);
        assert_eq!(registry.for_event("other").len(), 0);
    }

    #[test]
    fn channels_preserve_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SubscriberRegistry::new();
        registry.subscribe("fetch", logging_hook(&log, "first"));
        registry.subscribe("fetch", logging_hook(&log, "second"));
        registry.subscribe_all(logging_hook(&log, "any"));

        let mut ctx = Context::new(());
        let event = "fetch".to_string();
        block_on(async {
            for hook in registry.for_event("fetch") {
                hook.call(&mut ctx, &event).await.unwrap();
            }
            for hook in registry.for_all() {
                hook.call(&mut ctx, &event).await.unwrap();
            }
        });

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "any"]);
    }

    #[test]
    fn unsubscribe_removes_only_the_target() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SubscriberRegistry::new();
        let first = registry.subscribe("fetch", logging_hook(&log, "first"));
        registry.subscribe("fetch", logging_hook(&log, "second"));

        assert!(registry.unsubscribe(first));
        assert!(!registry.unsubscribe(first));
        assert_eq!(registry.for_event("fetch").len(), 1);
    }
}
