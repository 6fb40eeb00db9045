//! Typed query predicates evaluated against model instances.
//!
//! Predicates are built with [`query::builder`] or parsed from text with
//! [`query::parse`], and evaluated against anything implementing
//! [`FieldResolver`].

pub mod error;
pub mod model;
pub mod query;
pub mod record;
pub mod schema;
pub mod store;
pub mod values;

pub use error::{EvaluationError, SchemaError};
pub use model::{resolve_field, FieldAccessor, FieldResolver};
pub use query::{evaluate, parse, Predicate, Value};
pub use record::Record;
pub use schema::ModelSchema;
