use anyhow::Result;
use serde_json::Value;

use crate::form::{FormConfig, FormEngine};
use crate::schema::{FormSchema, schema_to_value};

use super::{BuilderAction, BuilderState, reduce};

pub type SchemaChangeHandler = Box<dyn FnMut(&Value)>;

/// Drives the builder reducer and reports committed schema edits to the
/// embedder. A live preview is a fresh engine built from the current schema.
pub struct Composer {
    state: BuilderState,
    on_schema_change: Option<SchemaChangeHandler>,
}

impl Composer {
    pub fn new(initial: Option<FormSchema>) -> Self {
        Self {
            state: BuilderState::new(initial),
            on_schema_change: None,
        }
    }

    /// Install a callback invoked with the exported schema JSON after every
    /// edit that actually changed the schema.
    pub fn with_schema_change(mut self, handler: impl FnMut(&Value) + 'static) -> Self {
        self.on_schema_change = Some(Box::new(handler));
        self
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn schema(&self) -> &FormSchema {
        &self.state.schema
    }

    pub fn dispatch(&mut self, action: BuilderAction) {
        let next = reduce(&self.state, action);
        let schema_changed = next.schema != self.state.schema;
        self.state = next;
        if schema_changed {
            if let Some(handler) = &mut self.on_schema_change {
                handler(&schema_to_value(&self.state.schema));
            }
        }
    }

    pub fn export(&self) -> Value {
        schema_to_value(&self.state.schema)
    }

    /// Fresh engine over the current schema for the live preview pane.
    pub fn preview_engine(&self, config: FormConfig) -> Result<FormEngine> {
        FormEngine::new(self.state.schema.clone(), config)
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
