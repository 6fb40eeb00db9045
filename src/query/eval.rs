use super::ast::{Comparison, Predicate, QueryOperator};
use super::coerce::{equals, haystack, ordering};
use crate::error::EvaluationError;
use crate::model::FieldResolver;
use std::cmp::Ordering;

pub fn evaluate<M: FieldResolver + ?Sized>(
    predicate: &Predicate,
    target: &M,
) -> Result<bool, EvaluationError> {
    match predicate {
        Predicate::Constant { value } => Ok(*value),
        Predicate::Not { child } => Ok(!evaluate(child, target)?),
        Predicate::And { children } => {
            for child in children {
                if !evaluate(child, target)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Or { children } => {
            for child in children {
                if evaluate(child, target)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Compare(cmp) => eval_compare(cmp, target),
    }
}

impl Predicate {
    pub fn evaluate<M: FieldResolver + ?Sized>(&self, target: &M) -> Result<bool, EvaluationError> {
        evaluate(self, target)
    }

    /// Instances from `items` that satisfy the predicate, in order.
    pub fn filter<'a, M: FieldResolver>(&self, items: &'a [M]) -> Result<Vec<&'a M>, EvaluationError> {
        let mut matched = Vec::new();
        for item in items {
            if self.evaluate(item)? {
                matched.push(item);
            }
        }
        Ok(matched)
    }
}

fn eval_compare<M: FieldResolver + ?Sized>(cmp: &Comparison, target: &M) -> Result<bool, EvaluationError> {
    // An unset value satisfies no operator, `ne` and `notContains` included.
    let Some(lhs) = target.field_value(&cmp.field)? else {
        tracing::trace!(field = %cmp.field, operator = cmp.operator.name(), "field unset");
        return Ok(false);
    };

    let op = &cmp.operator;
    let name = op.name();
    match op {
        QueryOperator::Eq(rhs) => equals(&lhs, rhs, name),
        QueryOperator::Ne(rhs) => Ok(!equals(&lhs, rhs, name)?),
        QueryOperator::Lt(rhs) => Ok(ordering(&lhs, rhs, name)? == Some(Ordering::Less)),
        QueryOperator::Le(rhs) => Ok(matches!(
            ordering(&lhs, rhs, name)?,
            Some(Ordering::Less | Ordering::Equal)
        )),
        QueryOperator::Gt(rhs) => Ok(ordering(&lhs, rhs, name)? == Some(Ordering::Greater)),
        QueryOperator::Ge(rhs) => Ok(matches!(
            ordering(&lhs, rhs, name)?,
            Some(Ordering::Greater | Ordering::Equal)
        )),
        QueryOperator::Contains(needle) => Ok(haystack(&lhs, name)?.contains(needle.as_str())),
        QueryOperator::NotContains(needle) => Ok(!haystack(&lhs, name)?.contains(needle.as_str())),
        QueryOperator::BeginsWith(prefix) => Ok(haystack(&lhs, name)?.starts_with(prefix.as_str())),
        QueryOperator::Between { start, end } => {
            let from_start = ordering(&lhs, start, name)?;
            let to_end = ordering(&lhs, end, name)?;
            Ok(matches!(from_start, Some(Ordering::Greater | Ordering::Equal))
                && matches!(to_end, Some(Ordering::Less | Ordering::Equal)))
        }
    }
}
