use indexmap::IndexMap;
use serde_json::Value;

/// The flat name → value map that backs a form instance. All writes are
/// equality-checked so downstream reactions only fire on actual changes;
/// a missing entry and an explicit `Null` are the same value.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    values: IndexMap<String, Value>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defaults(defaults: IndexMap<String, Value>) -> Self {
        Self { values: defaults }
    }

    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&Value::Null)
    }

    pub fn snapshot(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Write a value. Returns true when the stored value actually changed.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if self.get(name) == &value {
            return false;
        }
        self.values.insert(name.to_string(), value);
        true
    }

    /// Clear a field back to `Null`. Returns true when it held something else.
    pub fn clear(&mut self, name: &str) -> bool {
        self.set(name, Value::Null)
    }
}
