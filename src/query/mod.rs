pub mod ast;
pub mod builder;
mod coerce;
pub mod eval;
pub mod parser;
pub mod value;

pub use ast::{Comparison, Predicate, QueryOperator};
pub use eval::evaluate;
pub use parser::{parse, ParseError};
pub use value::{PersistableEnum, Value, ValueKind};
