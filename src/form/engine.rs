use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::schema::{
    FormComponent, FormSchema, OptionEntry, build_default_values, flatten_fields,
    normalize_options,
};
use crate::validation::{CustomCheck, ValidationSchema, build_validation_schema, validate};

use super::dependency::{DependencyProbe, FieldFlags};
use super::events::{EventEmitter, FIELD_CHANGE, Subscription};
use super::options::{LoadTicket, LoaderKind, OptionsState, OptionsView, PendingLoad};
use super::values::ValueStore;

/// Per-instance configuration threaded into the engine at construction:
/// custom component registry, option loaders, per-field validation callbacks,
/// default values. Builder-style, consumed by [`FormEngine::new`].
#[derive(Default)]
pub struct FormConfig {
    pub(crate) custom_components: IndexSet<String>,
    pub(crate) custom_validation: IndexMap<String, CustomCheck>,
    pub(crate) default_values: IndexMap<String, Value>,
    pub(crate) loaders: IndexMap<String, LoaderKind>,
    pub(crate) imperative_options: IndexMap<String, Vec<OptionEntry>>,
}

impl FormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known `componentKey` for `custom` fields. Keys not
    /// registered here render as inline error markers.
    pub fn with_custom_component(mut self, key: impl Into<String>) -> Self {
        self.custom_components.insert(key.into());
        self
    }

    pub fn with_custom_validation(
        mut self,
        field: impl Into<String>,
        check: impl Fn(&Value, &IndexMap<String, Value>) -> Option<String> + 'static,
    ) -> Self {
        self.custom_validation.insert(field.into(), Box::new(check));
        self
    }

    pub fn with_default_value(mut self, field: impl Into<String>, value: Value) -> Self {
        self.default_values.insert(field.into(), value);
        self
    }

    pub fn with_default_values(mut self, values: IndexMap<String, Value>) -> Self {
        self.default_values.extend(values);
        self
    }

    /// Register a loader callback invoked by the engine whenever the field's
    /// options need (re)loading.
    pub fn with_option_loader(
        mut self,
        field: impl Into<String>,
        loader: impl FnMut(Option<&Value>) -> Result<Vec<OptionEntry>, String> + 'static,
    ) -> Self {
        self.loaders
            .insert(field.into(), LoaderKind::Callback(Box::new(loader)));
        self
    }

    /// Mark a field as dynamically loaded without a callback; the engine
    /// records pending loads for the embedder to complete asynchronously.
    pub fn with_deferred_loader(mut self, field: impl Into<String>) -> Self {
        self.loaders.insert(field.into(), LoaderKind::Deferred);
        self
    }

    pub fn with_field_options(
        mut self,
        field: impl Into<String>,
        options: Vec<OptionEntry>,
    ) -> Self {
        self.imperative_options.insert(field.into(), options);
        self
    }
}

/// Outcome of a submission attempt, in the manner of a validation pass:
/// either the full value map, or the field-scoped error map that blocked it.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(IndexMap<String, Value>),
    Rejected(IndexMap<String, String>),
}

#[derive(Debug, Clone, Copy)]
pub struct SetValueOpts {
    /// Emit `fieldChange` for this write. On by default; dependency-driven
    /// clears and resets go through with this off.
    pub emit: bool,
}

impl Default for SetValueOpts {
    fn default() -> Self {
        Self { emit: true }
    }
}

/// The form-state context: owns the value map, dependency probes, dynamic
/// option state, validation schema, and event emitter for one rendered form.
///
/// In controlled mode the embedder constructs and drives a `FormEngine`
/// directly; [`Form`] wraps one together with an `on_submit` handler for the
/// standalone case.
pub struct FormEngine {
    pub(crate) schema: FormSchema,
    pub(crate) values: ValueStore,
    pub(crate) defaults: IndexMap<String, Value>,
    pub(crate) emitter: EventEmitter,
    pub(crate) probes: Vec<DependencyProbe>,
    pub(crate) options: IndexMap<String, OptionsState>,
    pub(crate) chains: IndexMap<String, String>,
    pub(crate) loaders: IndexMap<String, LoaderKind>,
    pub(crate) imperative_options: IndexMap<String, Vec<OptionEntry>>,
    pub(crate) custom_components: IndexSet<String>,
    pub(crate) validation: ValidationSchema,
    pub(crate) errors: IndexMap<String, String>,
    pub(crate) pending: Vec<PendingLoad>,
}

impl FormEngine {
    pub fn new(schema: FormSchema, config: FormConfig) -> Result<Self> {
        let FormConfig {
            custom_components,
            custom_validation,
            default_values,
            loaders,
            imperative_options,
        } = config;

        let mut defaults = build_default_values(&schema.components);
        defaults.extend(default_values);

        let mut probes = Vec::new();
        walk_components(&schema.components, &mut |component| {
            if let Some(probe) = DependencyProbe::for_component(component) {
                probes.push(probe);
            }
        });

        let validation = build_validation_schema(&schema.components, custom_validation)?;

        let mut chains = IndexMap::new();
        for field in flatten_fields(&schema.components) {
            if let FormComponent::Select {
                core,
                options_depends_on: Some(upstream),
                ..
            } = field
            {
                if loaders.contains_key(&core.name) {
                    chains.insert(core.name.clone(), upstream.clone());
                }
            }
        }

        let options = loaders
            .keys()
            .map(|name| (name.clone(), OptionsState::default()))
            .collect();

        let mut engine = Self {
            values: ValueStore::from_defaults(defaults.clone()),
            defaults,
            emitter: EventEmitter::new(),
            probes,
            options,
            chains,
            loaders,
            imperative_options,
            custom_components,
            validation,
            errors: IndexMap::new(),
            pending: Vec::new(),
            schema,
        };

        for probe in &mut engine.probes {
            probe.last = probe.evaluate(engine.values.snapshot());
        }
        engine.initial_loads();

        Ok(engine)
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        self.values.snapshot()
    }

    pub fn value(&self, name: &str) -> &Value {
        self.values.get(name)
    }

    /// User-driven value change: writes the value, emits `fieldChange`, and
    /// runs dependency and option reactions. A write that does not change
    /// the stored value is a no-op.
    pub fn set_value(&mut self, name: &str, value: Value) {
        self.set_value_with(name, value, SetValueOpts::default());
    }

    pub fn set_value_with(&mut self, name: &str, value: Value, opts: SetValueOpts) {
        if !self.values.set(name, value.clone()) {
            return;
        }
        if opts.emit {
            self.emitter.emit(FIELD_CHANGE, name, &value);
        }
        self.react(vec![name.to_string()]);
    }

    /// Put a field back to its default value and drop its validation error.
    /// Does not emit `fieldChange`.
    pub fn reset_field(&mut self, name: &str) {
        self.errors.shift_remove(name);
        let default = self.defaults.get(name).cloned().unwrap_or(Value::Null);
        self.set_value_with(name, default, SetValueOpts { emit: false });
    }

    /// Imperative option override: takes precedence over static options and
    /// loader state until cleared.
    pub fn set_field_options(&mut self, name: &str, options: Vec<OptionEntry>) {
        self.imperative_options.insert(name.to_string(), options);
    }

    pub fn clear_field_options(&mut self, name: &str) {
        self.imperative_options.shift_remove(name);
    }

    pub fn on(&mut self, event: &str, listener: impl FnMut(&str, &Value) + 'static) -> Subscription {
        self.emitter.on(event, listener)
    }

    pub fn off(&mut self, event: &str, subscription: Subscription) {
        self.emitter.off(event, subscription);
    }

    /// Rule-derived flags for a component; defaults for components without
    /// dependencies.
    pub fn flags(&self, name: &str) -> FieldFlags {
        self.probes
            .iter()
            .find(|probe| probe.target == name)
            .map(|probe| probe.last)
            .unwrap_or_default()
    }

    /// Current options for a select-like field: imperative override first,
    /// then static options when no loader is registered, then loader state.
    pub fn options_view(&self, name: &str) -> OptionsView {
        if let Some(entries) = self.imperative_options.get(name) {
            return OptionsView::settled(normalize_options(entries));
        }

        if !self.loaders.contains_key(name) {
            let options = self
                .find_component(name)
                .and_then(FormComponent::options)
                .map(|entries| normalize_options(entries))
                .unwrap_or_default();
            return OptionsView::settled(options);
        }

        let state = self.options.get(name).cloned().unwrap_or_default();
        OptionsView {
            options: state.options,
            loading: state.loading,
            error: state.error,
        }
    }

    /// Re-run the full validation schema against the current values.
    pub fn validate(&mut self) -> &IndexMap<String, String> {
        self.errors = validate(&self.validation, self.values.snapshot());
        &self.errors
    }

    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        self.validate();
        if self.errors.is_empty() {
            SubmitOutcome::Accepted(self.values.snapshot().clone())
        } else {
            SubmitOutcome::Rejected(self.errors.clone())
        }
    }

    /// Force a reload of a dynamically loaded field with the current
    /// upstream value.
    pub fn reload_options(&mut self, name: &str) {
        if !self.loaders.contains_key(name) {
            return;
        }
        match self.chains.get(name).cloned() {
            Some(upstream_name) => {
                let upstream = self.values.get(&upstream_name).clone();
                if is_empty_upstream(&upstream) {
                    self.reset_options_state(name);
                } else {
                    self.fire_load(name, Some(upstream));
                }
            }
            None => self.fire_load(name, None),
        }
    }

    /// Loads waiting on the embedder (deferred loaders). Complete each with
    /// [`FormEngine::complete_options_load`].
    pub fn take_pending_loads(&mut self) -> Vec<PendingLoad> {
        std::mem::take(&mut self.pending)
    }

    /// Deliver a load result. A stale ticket (a newer request was issued for
    /// the field since) is discarded and never overwrites current state.
    pub fn complete_options_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<OptionEntry>, String>,
    ) {
        let Some(state) = self.options.get_mut(&ticket.field) else {
            return;
        };
        if state.version != ticket.version {
            log::debug!("discarding stale options result for '{}'", ticket.field);
            return;
        }
        match result {
            Ok(entries) => {
                state.options = normalize_options(&entries);
                state.loading = false;
                state.error = None;
            }
            Err(message) => {
                log::warn!("option loader for '{}' failed: {message}", ticket.field);
                state.options.clear();
                state.loading = false;
                state.error = Some(message);
            }
        }
    }

    pub fn find_component(&self, name: &str) -> Option<&FormComponent> {
        find_component_in(&self.schema.components, name)
    }

    fn initial_loads(&mut self) {
        let mut changed = Vec::new();
        let fields: Vec<String> = self.loaders.keys().cloned().collect();
        for field in fields {
            match self.chains.get(&field).cloned() {
                Some(upstream_name) => {
                    let upstream = self.values.get(&upstream_name).clone();
                    if is_empty_upstream(&upstream) {
                        self.reset_options_state(&field);
                        if self.values.set(&field, Value::String(String::new())) {
                            changed.push(field.clone());
                        }
                    } else {
                        self.fire_load(&field, Some(upstream));
                    }
                }
                None => self.fire_load(&field, None),
            }
        }
        if !changed.is_empty() {
            self.react(changed);
        }
    }

    /// Process a batch of changed fields to a fixed point: dependency probes
    /// re-evaluate, hide transitions clear values, chained option fields
    /// reset and reload. All consumers of one changed field observe the same
    /// snapshot; every write is equality-checked, so cascades terminate.
    fn react(&mut self, seed: Vec<String>) {
        let mut queue: VecDeque<String> = seed.into();
        while let Some(field) = queue.pop_front() {
            for index in 0..self.probes.len() {
                let (flags, was) = {
                    let probe = &self.probes[index];
                    if !probe.watches(&field) {
                        continue;
                    }
                    (probe.evaluate(self.values.snapshot()), probe.last)
                };
                self.probes[index].last = flags;
                if was.visible && !flags.visible && self.probes[index].clears_value {
                    let target = self.probes[index].target.clone();
                    log::debug!("'{target}' hidden by change to '{field}', clearing its value");
                    if self.values.clear(&target) {
                        queue.push_back(target);
                    }
                }
            }

            let chained: Vec<String> = self
                .chains
                .iter()
                .filter(|(_, upstream)| upstream.as_str() == field)
                .map(|(name, _)| name.clone())
                .collect();
            for name in chained {
                let upstream = self.values.get(&field).clone();
                if is_empty_upstream(&upstream) {
                    self.reset_options_state(&name);
                    if self.values.set(&name, Value::String(String::new())) {
                        queue.push_back(name);
                    }
                } else {
                    // Upstream changed: force a re-select before the new
                    // options arrive.
                    if self.values.set(&name, Value::String(String::new())) {
                        queue.push_back(name.clone());
                    }
                    self.fire_load(&name, Some(upstream));
                }
            }
        }
    }

    fn fire_load(&mut self, field: &str, upstream: Option<Value>) {
        let Some(state) = self.options.get_mut(field) else {
            return;
        };
        state.version += 1;
        state.loading = true;
        state.error = None;
        let ticket = LoadTicket {
            field: field.to_string(),
            version: state.version,
        };
        log::debug!("requesting options for '{field}'");

        let outcome = match self.loaders.get_mut(field) {
            Some(LoaderKind::Callback(loader)) => Some(loader(upstream.as_ref())),
            Some(LoaderKind::Deferred) => {
                self.pending.push(PendingLoad {
                    ticket: ticket.clone(),
                    upstream,
                });
                None
            }
            None => None,
        };
        if let Some(result) = outcome {
            self.complete_options_load(ticket, result);
        }
    }

    /// Invalidate any in-flight load and leave the field with no options.
    fn reset_options_state(&mut self, field: &str) {
        if let Some(state) = self.options.get_mut(field) {
            state.version += 1;
            state.options.clear();
            state.loading = false;
            state.error = None;
        }
    }
}

impl std::fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormEngine")
            .field("schema", &self.schema.title)
            .field("values", self.values.snapshot())
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

pub type SubmitHandler = Box<dyn FnMut(&IndexMap<String, Value>)>;

/// Standalone form: an engine plus the submit handler, for embedders that do
/// not manage their own form-state context.
pub struct Form {
    engine: FormEngine,
    on_submit: SubmitHandler,
}

impl Form {
    pub fn new(
        schema: FormSchema,
        config: FormConfig,
        on_submit: impl FnMut(&IndexMap<String, Value>) + 'static,
    ) -> Result<Self> {
        Ok(Self {
            engine: FormEngine::new(schema, config)?,
            on_submit: Box::new(on_submit),
        })
    }

    /// Validate and, if everything passes, invoke the submit handler with
    /// the value map. Returns whether the submission went through.
    pub fn submit(&mut self) -> bool {
        match self.engine.submit() {
            SubmitOutcome::Accepted(values) => {
                (self.on_submit)(&values);
                true
            }
            SubmitOutcome::Rejected(errors) => {
                log::debug!("submission blocked by {} field error(s)", errors.len());
                false
            }
        }
    }

    pub fn engine(&self) -> &FormEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FormEngine {
        &mut self.engine
    }
}

impl Deref for Form {
    type Target = FormEngine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

impl DerefMut for Form {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.engine
    }
}

/// Visit every component in the tree, layout nodes included.
pub(crate) fn walk_components<'a>(
    components: &'a [FormComponent],
    visit: &mut impl FnMut(&'a FormComponent),
) {
    for component in components {
        visit(component);
        match component {
            FormComponent::Group { components, .. } => walk_components(components, visit),
            FormComponent::Columns { columns, .. } => {
                for column in columns {
                    walk_components(&column.components, visit);
                }
            }
            _ => {}
        }
    }
}

fn find_component_in<'a>(components: &'a [FormComponent], name: &str) -> Option<&'a FormComponent> {
    for component in components {
        if component.name() == name {
            return Some(component);
        }
        match component {
            FormComponent::Group { components, .. } => {
                if let Some(found) = find_component_in(components, name) {
                    return Some(found);
                }
            }
            FormComponent::Columns { columns, .. } => {
                for column in columns {
                    if let Some(found) = find_component_in(&column.components, name) {
                        return Some(found);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Mirrors the loose emptiness test applied to chained upstream values: an
/// unset, empty-string, false, or zero upstream means "no selection yet".
fn is_empty_upstream(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}
