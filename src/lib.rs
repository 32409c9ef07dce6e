#![deny(rust_2018_idioms)]

pub mod builder;
pub mod form;
pub mod rules;
pub mod schema;
pub mod validation;

#[cfg(test)]
mod tests;

pub use form::{Form, FormConfig, FormEngine, SubmitOutcome};
pub use schema::{FormSchema, parse_form_schema, schema_to_value};

pub mod prelude {
    pub use crate::builder::{BuilderAction, BuilderState, Composer, reduce};
    pub use crate::form::{
        FIELD_CHANGE, FieldFlags, Form, FormConfig, FormEngine, RenderNode, SubmitOutcome,
    };
    pub use crate::schema::{FormSchema, parse_form_schema, schema_to_value};
}
