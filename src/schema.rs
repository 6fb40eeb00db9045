//! Model schemas: the declared fields of one model and their types.
//!
//! ```yaml
//! name: Post
//! fields:
//!   - name: title
//!     type: string
//!   - name: rating
//!     type: double
//!   - name: status
//!     type: enum
//!     cases: [draft, published, private]
//! ```

use crate::error::SchemaError;
use crate::query::{Comparison, Predicate, QueryOperator, Value, ValueKind};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    /// Raw values of the enum cases; only meaningful for `enum` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cases: Vec<String>,
}

impl ModelSchema {
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| SchemaError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Converts a raw YAML scalar into the field's value. `null` is unset.
    pub fn convert(&self, spec: &FieldSpec, raw: &YamlValue) -> Result<Option<Value>, SchemaError> {
        if raw.is_null() {
            return Ok(None);
        }

        let value = match spec.kind {
            ValueKind::Bool => raw.as_bool().map(Value::Bool),
            ValueKind::Int => raw.as_i64().map(Value::Int),
            ValueKind::Double => yaml_to_number(raw).map(Value::Double),
            ValueKind::String => yaml_to_string(raw).map(Value::String),
            ValueKind::Date => raw
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .map(Value::Date),
            ValueKind::DateTime => raw
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc))),
            ValueKind::Time => raw
                .as_str()
                .and_then(|s| NaiveTime::parse_from_str(s, "%H:%M:%S%.f").ok())
                .map(Value::Time),
            ValueKind::Enum => match yaml_to_string(raw) {
                Some(case) => Some(enum_case(spec, &case)?),
                None => None,
            },
        };

        value.map(Some).ok_or_else(|| SchemaError::InvalidValue {
            field: spec.name.clone(),
            expected: spec.kind.to_string(),
            found: describe(raw),
        })
    }

    /// Checks a predicate against the declared fields and rewrites string
    /// operands of `eq`/`ne` on enum fields into enum cases.
    pub fn bind(&self, predicate: &Predicate) -> Result<Predicate, SchemaError> {
        Ok(match predicate {
            Predicate::Constant { value } => Predicate::Constant { value: *value },
            Predicate::Not { child } => Predicate::Not {
                child: Box::new(self.bind(child)?),
            },
            Predicate::And { children } => Predicate::And {
                children: self.bind_all(children)?,
            },
            Predicate::Or { children } => Predicate::Or {
                children: self.bind_all(children)?,
            },
            Predicate::Compare(cmp) => Predicate::Compare(self.bind_comparison(cmp)?),
        })
    }

    fn bind_all(&self, children: &[Predicate]) -> Result<Vec<Predicate>, SchemaError> {
        children.iter().map(|child| self.bind(child)).collect()
    }

    fn bind_comparison(&self, cmp: &Comparison) -> Result<Comparison, SchemaError> {
        let spec = self.field(&cmp.field).ok_or_else(|| SchemaError::UnknownField {
            model: self.name.clone(),
            field: cmp.field.clone(),
        })?;

        let op = &cmp.operator;
        let supported = match spec.kind {
            ValueKind::Bool => !op.is_ordering() && !op.is_substring(),
            ValueKind::String => true,
            _ => !op.is_substring(),
        };
        if !supported {
            return Err(SchemaError::UnsupportedOperator {
                field: spec.name.clone(),
                kind: spec.kind,
                operator: op.name(),
            });
        }

        let operator = match op {
            QueryOperator::Eq(v) if spec.kind == ValueKind::Enum => QueryOperator::Eq(enum_operand(spec, v)?),
            QueryOperator::Ne(v) if spec.kind == ValueKind::Enum => QueryOperator::Ne(enum_operand(spec, v)?),
            other => other.clone(),
        };

        Ok(Comparison {
            field: cmp.field.clone(),
            operator,
        })
    }
}

fn enum_operand(spec: &FieldSpec, v: &Value) -> Result<Value, SchemaError> {
    match v {
        Value::String(s) | Value::Enum(s) => enum_case(spec, s),
        // Left for the evaluator to reject with the operand kinds.
        other => Ok(other.clone()),
    }
}

fn enum_case(spec: &FieldSpec, case: &str) -> Result<Value, SchemaError> {
    if spec.cases.iter().any(|c| c == case) {
        Ok(Value::Enum(case.to_string()))
    } else {
        Err(SchemaError::UnknownEnumCase {
            field: spec.name.clone(),
            case: case.to_string(),
        })
    }
}

fn yaml_to_string(v: &YamlValue) -> Option<String> {
    match v {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_to_number(v: &YamlValue) -> Option<f64> {
    v.as_f64().or_else(|| v.as_i64().map(|i| i as f64))
}

fn describe(v: &YamlValue) -> String {
    match v {
        YamlValue::Null => "null".to_string(),
        YamlValue::Bool(b) => format!("bool {}", b),
        YamlValue::Number(n) => format!("number {}", n),
        YamlValue::String(s) => format!("string {:?}", s),
        YamlValue::Sequence(_) => "sequence".to_string(),
        YamlValue::Mapping(_) => "mapping".to_string(),
        YamlValue::Tagged(t) => format!("tagged value {}", t.tag),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::query::builder::{and, field, not};
    use serde_yaml::from_str;

    pub(crate) fn post_schema() -> ModelSchema {
        from_str(
            r#"
name: Post
fields:
  - name: title
    type: string
  - name: rating
    type: double
  - name: draftCount
    type: int
  - name: isFeatured
    type: bool
  - name: status
    type: enum
    cases: [draft, published, private]
  - name: publishedOn
    type: date
  - name: updatedAt
    type: datetime
  - name: opensAt
    type: time
"#,
        )
        .unwrap()
    }

    fn convert(field: &str, yaml: &str) -> Result<Option<Value>, SchemaError> {
        let schema = post_schema();
        let spec = schema.field(field).unwrap();
        schema.convert(spec, &from_str(yaml).unwrap())
    }

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert("rating", "4").unwrap(), Some(Value::Double(4.0)));
        assert_eq!(convert("draftCount", "4").unwrap(), Some(Value::Int(4)));
        assert_eq!(convert("title", "2024").unwrap(), Some(Value::from("2024")));
        assert_eq!(convert("isFeatured", "~").unwrap(), None);
        assert_eq!(
            convert("status", "draft").unwrap(),
            Some(Value::Enum("draft".to_string()))
        );
    }

    #[test]
    fn test_convert_temporal() {
        assert_eq!(
            convert("publishedOn", "2024-02-29").unwrap(),
            Some(Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
        assert_eq!(
            convert("opensAt", "\"08:00:00.5\"").unwrap(),
            Some(Value::Time(NaiveTime::from_hms_milli_opt(8, 0, 0, 500).unwrap()))
        );
        let Some(Value::DateTime(dt)) = convert("updatedAt", "2024-01-01T12:00:00+01:00").unwrap() else {
            panic!("Expected datetime");
        };
        assert_eq!(dt.to_rfc3339(), "2024-01-01T11:00:00+00:00");
    }

    #[test]
    fn test_convert_rejects_mismatches() {
        assert!(matches!(
            convert("draftCount", "1.5"),
            Err(SchemaError::InvalidValue { .. })
        ));
        assert!(matches!(
            convert("status", "archived"),
            Err(SchemaError::UnknownEnumCase { .. })
        ));
        assert!(matches!(
            convert("publishedOn", "yesterday"),
            Err(SchemaError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_bind_turns_strings_into_enum_cases() {
        let schema = post_schema();
        let bound = schema
            .bind(&and(field("status").eq("published"), not(field("status").gt("draft"))))
            .unwrap();
        assert_eq!(
            bound,
            and(
                field("status").eq(Value::Enum("published".to_string())),
                not(field("status").gt("draft"))
            )
        );
    }

    #[test]
    fn test_bind_rejects_invalid_predicates() {
        let schema = post_schema();
        assert!(matches!(
            schema.bind(&field("author").eq("x")),
            Err(SchemaError::UnknownField { .. })
        ));
        assert!(matches!(
            schema.bind(&field("status").eq("archived")),
            Err(SchemaError::UnknownEnumCase { .. })
        ));
        assert!(matches!(
            schema.bind(&field("isFeatured").lt(true)),
            Err(SchemaError::UnsupportedOperator { operator: "lt", .. })
        ));
        assert!(matches!(
            schema.bind(&field("rating").contains("4")),
            Err(SchemaError::UnsupportedOperator { .. })
        ));
    }
}
