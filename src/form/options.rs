use serde_json::Value;

use crate::schema::{OptionEntry, OptionItem};

/// A registered source of dynamic options for one field.
///
/// `Callback` loaders are invoked by the engine at the trigger points (form
/// construction, upstream change, explicit reload). `Deferred` marks a field
/// as dynamically loaded without a callback: the engine records a
/// [`PendingLoad`] and the embedder completes it later, the shape to use
/// when the real loader is asynchronous.
pub enum LoaderKind {
    Callback(OptionLoader),
    Deferred,
}

pub type OptionLoader = Box<dyn FnMut(Option<&Value>) -> Result<Vec<OptionEntry>, String>>;

impl std::fmt::Debug for LoaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderKind::Callback(_) => f.write_str("LoaderKind::Callback"),
            LoaderKind::Deferred => f.write_str("LoaderKind::Deferred"),
        }
    }
}

/// Live option-load state for one field with a registered loader.
#[derive(Debug, Clone, Default)]
pub struct OptionsState {
    pub options: Vec<OptionItem>,
    pub loading: bool,
    pub error: Option<String>,
    pub(crate) version: u64,
}

/// Captures which request a load result belongs to. A completion whose
/// version is no longer current for the field is stale and gets discarded,
/// so a slow response can never overwrite a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub field: String,
    pub(crate) version: u64,
}

/// A load the engine wants fulfilled. Produced for `Deferred` loaders;
/// drained via `FormEngine::take_pending_loads` and answered with
/// `FormEngine::complete_options_load`.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub ticket: LoadTicket,
    pub upstream: Option<Value>,
}

/// What a select-like field should currently display, after applying the
/// precedence imperative override → static options → loader state.
#[derive(Debug, Clone, Default)]
pub struct OptionsView {
    pub options: Vec<OptionItem>,
    pub loading: bool,
    pub error: Option<String>,
}

impl OptionsView {
    pub fn settled(options: Vec<OptionItem>) -> Self {
        Self {
            options,
            loading: false,
            error: None,
        }
    }
}
