mod dependency;
mod engine;
mod events;
mod options;
mod values;
mod view;

pub use dependency::{DependencyProbe, FieldFlags};
pub use engine::{Form, FormConfig, FormEngine, SetValueOpts, SubmitHandler, SubmitOutcome};
pub use events::{EventEmitter, FIELD_CHANGE, Subscription};
pub use options::{LoadTicket, LoaderKind, OptionLoader, OptionsState, OptionsView, PendingLoad};
pub use values::ValueStore;
pub use view::{ColumnView, ControlKind, FieldView, RenderNode};
