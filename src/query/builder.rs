//! Fluent construction of predicate trees.
//!
//! ```
//! use modelq::query::builder::{and, field, or};
//!
//! let predicate = or(
//!     and(field("rating").ge(4), field("title").begins_with("Rust")),
//!     field("status").gt("draft"),
//! );
//! assert_eq!(
//!     predicate.to_string(),
//!     r#"((rating >= 4 AND title beginsWith "Rust") OR status > "draft")"#
//! );
//! ```

use super::ast::{Comparison, Predicate, QueryOperator};
use super::value::Value;
use std::ops;

/// A named field of a model, the left-hand side of every comparison.
#[derive(Debug, Clone)]
pub struct FieldKey {
    name: String,
}

pub fn field(name: impl Into<String>) -> FieldKey {
    FieldKey::new(name)
}

impl FieldKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eq(&self, value: impl Into<Value>) -> Predicate {
        self.compare(QueryOperator::Eq(value.into()))
    }

    pub fn ne(&self, value: impl Into<Value>) -> Predicate {
        self.compare(QueryOperator::Ne(value.into()))
    }

    pub fn lt(&self, value: impl Into<Value>) -> Predicate {
        self.compare(QueryOperator::Lt(value.into()))
    }

    pub fn le(&self, value: impl Into<Value>) -> Predicate {
        self.compare(QueryOperator::Le(value.into()))
    }

    pub fn gt(&self, value: impl Into<Value>) -> Predicate {
        self.compare(QueryOperator::Gt(value.into()))
    }

    pub fn ge(&self, value: impl Into<Value>) -> Predicate {
        self.compare(QueryOperator::Ge(value.into()))
    }

    pub fn contains(&self, needle: impl Into<String>) -> Predicate {
        self.compare(QueryOperator::Contains(needle.into()))
    }

    pub fn not_contains(&self, needle: impl Into<String>) -> Predicate {
        self.compare(QueryOperator::NotContains(needle.into()))
    }

    pub fn begins_with(&self, prefix: impl Into<String>) -> Predicate {
        self.compare(QueryOperator::BeginsWith(prefix.into()))
    }

    /// Closed range `start <= value <= end`. The bounds are not reordered.
    pub fn between(&self, start: impl Into<Value>, end: impl Into<Value>) -> Predicate {
        self.compare(QueryOperator::Between {
            start: start.into(),
            end: end.into(),
        })
    }

    fn compare(&self, operator: QueryOperator) -> Predicate {
        Predicate::Compare(Comparison {
            field: self.name.clone(),
            operator,
        })
    }
}

/// Matches every instance.
pub fn all() -> Predicate {
    Predicate::Constant { value: true }
}

/// Matches no instance.
pub fn none() -> Predicate {
    Predicate::Constant { value: false }
}

pub fn and(lhs: Predicate, rhs: Predicate) -> Predicate {
    let mut children = Vec::new();
    for p in [lhs, rhs] {
        match p {
            Predicate::And { children: nested } => children.extend(nested),
            other => children.push(other),
        }
    }
    Predicate::And { children }
}

pub fn or(lhs: Predicate, rhs: Predicate) -> Predicate {
    let mut children = Vec::new();
    for p in [lhs, rhs] {
        match p {
            Predicate::Or { children: nested } => children.extend(nested),
            other => children.push(other),
        }
    }
    Predicate::Or { children }
}

pub fn not(predicate: Predicate) -> Predicate {
    Predicate::Not {
        child: Box::new(predicate),
    }
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        and(self, other)
    }

    pub fn or(self, other: Predicate) -> Predicate {
        or(self, other)
    }
}

impl ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        not(self)
    }
}
