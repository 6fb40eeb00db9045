use crate::error::EvaluationError;
use crate::query::Value;
use std::borrow::Cow;

/// Field access for predicate evaluation.
///
/// `Ok(None)` means the field exists on the model but holds no value.
/// A name the model does not declare is `EvaluationError::FieldNotFound`.
pub trait FieldResolver {
    fn field_value(&self, name: &str) -> Result<Option<Cow<'_, Value>>, EvaluationError>;
}

impl<T: FieldResolver + ?Sized> FieldResolver for &T {
    fn field_value(&self, name: &str) -> Result<Option<Cow<'_, Value>>, EvaluationError> {
        (**self).field_value(name)
    }
}

/// One entry of a model's static field table.
pub struct FieldAccessor<T> {
    pub name: &'static str,
    pub get: fn(&T) -> Option<Value>,
}

impl<T> FieldAccessor<T> {
    pub const fn new(name: &'static str, get: fn(&T) -> Option<Value>) -> Self {
        Self { name, get }
    }
}

/// Looks `name` up in a static accessor table and reads it from `instance`.
///
/// Models implement `FieldResolver` by delegating here with their table.
pub fn resolve_field<'a, T>(
    fields: &[FieldAccessor<T>],
    instance: &'a T,
    name: &str,
) -> Result<Option<Cow<'a, Value>>, EvaluationError> {
    let accessor = fields
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| EvaluationError::FieldNotFound(name.to_string()))?;
    Ok((accessor.get)(instance).map(Cow::Owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Comment {
        content: String,
        rating: Option<i64>,
    }

    static COMMENT_FIELDS: &[FieldAccessor<Comment>] = &[
        FieldAccessor::new("content", |c: &Comment| Some(Value::from(c.content.as_str()))),
        FieldAccessor::new("rating", |c: &Comment| c.rating.map(Value::Int)),
    ];

    impl FieldResolver for Comment {
        fn field_value(&self, name: &str) -> Result<Option<Cow<'_, Value>>, EvaluationError> {
            resolve_field(COMMENT_FIELDS, self, name)
        }
    }

    #[test]
    fn test_table_lookup() {
        let comment = Comment {
            content: "hello".to_string(),
            rating: None,
        };
        assert_eq!(
            comment.field_value("content").unwrap().as_deref(),
            Some(&Value::from("hello"))
        );
        assert_eq!(comment.field_value("rating").unwrap(), None);
        assert_eq!(
            comment.field_value("author").unwrap_err(),
            EvaluationError::FieldNotFound("author".to_string())
        );
    }
}
