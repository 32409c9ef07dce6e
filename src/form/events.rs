use indexmap::IndexMap;
use serde_json::Value;

/// Event name fired on every user-driven field change.
pub const FIELD_CHANGE: &str = "fieldChange";

type Listener = Box<dyn FnMut(&str, &Value)>;

/// Token returned by [`EventEmitter::on`]; pass it back to `off` to
/// unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

/// Minimal publish/subscribe registry scoped to one form instance.
/// Listeners run in subscription order.
#[derive(Default)]
pub struct EventEmitter {
    listeners: IndexMap<String, Vec<(u64, Listener)>>,
    next_id: u64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &mut self,
        event: &str,
        listener: impl FnMut(&str, &Value) + 'static,
    ) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push((id, Box::new(listener)));
        Subscription(id)
    }

    pub fn off(&mut self, event: &str, subscription: Subscription) {
        if let Some(entries) = self.listeners.get_mut(event) {
            entries.retain(|(id, _)| *id != subscription.0);
        }
    }

    pub fn emit(&mut self, event: &str, field: &str, value: &Value) {
        if let Some(entries) = self.listeners.get_mut(event) {
            for (_, listener) in entries.iter_mut() {
                listener(field, value);
            }
        }
    }

    pub fn remove_all(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("events", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}
