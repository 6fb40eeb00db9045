//! Coercion table for comparing a field value against an operand.
//!
//! Every pair of `Value` kinds either has a rule here or is reported as
//! `EvaluationError::UnsupportedComparison`.

use super::value::Value;
use crate::error::EvaluationError;
use std::cmp::Ordering;

/// Equality as used by `eq` and `ne`.
pub(crate) fn equals(lhs: &Value, rhs: &Value, operator: &'static str) -> Result<bool, EvaluationError> {
    let equal = match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Date(a), Value::Date(b)) => a == b,
        (Value::DateTime(a), Value::DateTime(b)) => a == b,
        (Value::Time(a), Value::Time(b)) => a == b,
        // Case identity. Raw values are unique per case, so a raw string
        // names at most one case.
        (Value::Enum(a), Value::Enum(b) | Value::String(b)) | (Value::String(a), Value::Enum(b)) => a == b,
        _ => match numeric_pair(lhs, rhs) {
            Some((a, b)) => a == b,
            None => return Err(unsupported(lhs, rhs, operator)),
        },
    };
    Ok(equal)
}

/// Ordering as used by `lt`, `le`, `gt`, `ge` and `between`.
///
/// `None` means the values are unordered (a NaN was involved), which makes
/// every ordering operator false.
pub(crate) fn ordering(
    lhs: &Value,
    rhs: &Value,
    operator: &'static str,
) -> Result<Option<Ordering>, EvaluationError> {
    let ordering = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        // Enums order by raw value, against strings or other enums.
        (Value::Enum(a), Value::Enum(b) | Value::String(b)) | (Value::String(a), Value::Enum(b)) => {
            Some(a.cmp(b))
        }
        _ => match numeric_pair(lhs, rhs) {
            Some((a, b)) => a.partial_cmp(&b),
            None => return Err(unsupported(lhs, rhs, operator)),
        },
    };
    Ok(ordering)
}

/// The field value as a string haystack for `contains`, `notContains` and
/// `beginsWith`.
pub(crate) fn haystack<'a>(lhs: &'a Value, operator: &'static str) -> Result<&'a str, EvaluationError> {
    match lhs {
        Value::String(s) => Ok(s),
        other => Err(EvaluationError::UnsupportedComparison {
            lhs: other.kind(),
            rhs: super::ValueKind::String,
            operator,
        }),
    }
}

fn numeric_pair(lhs: &Value, rhs: &Value) -> Option<(f64, f64)> {
    Some((as_f64(lhs)?, as_f64(rhs)?))
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Double(d) => Some(*d),
        _ => None,
    }
}

fn unsupported(lhs: &Value, rhs: &Value, operator: &'static str) -> EvaluationError {
    EvaluationError::UnsupportedComparison {
        lhs: lhs.kind(),
        rhs: rhs.kind(),
        operator,
    }
}
