use crate::error::{EvaluationError, SchemaError};
use crate::model::FieldResolver;
use crate::query::Value;
use crate::schema::ModelSchema;
use serde_yaml::{Mapping, Value as YamlValue};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One model instance loaded from a record file, typed by its schema.
#[derive(Debug, Clone)]
pub struct Record<'s> {
    schema: &'s ModelSchema,
    label: String,
    values: BTreeMap<String, Value>,
}

impl<'s> Record<'s> {
    pub fn from_mapping(schema: &'s ModelSchema, label: String, mapping: &Mapping) -> Result<Self, SchemaError> {
        let mut values = BTreeMap::new();

        for (key, raw) in mapping {
            let Some(key) = key.as_str() else {
                continue;
            };
            let Some(spec) = schema.field(key) else {
                tracing::debug!(record = %label, key, "ignoring undeclared key");
                continue;
            };
            if let Some(value) = schema.convert(spec, raw)? {
                values.insert(spec.name.clone(), value);
            }
        }

        Ok(Self { schema, label, values })
    }

    /// Where the record came from, for display.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }
}

impl FieldResolver for Record<'_> {
    fn field_value(&self, name: &str) -> Result<Option<Cow<'_, Value>>, EvaluationError> {
        if self.schema.field(name).is_none() {
            return Err(EvaluationError::FieldNotFound(name.to_string()));
        }
        Ok(self.values.get(name).map(Cow::Borrowed))
    }
}

/// Loads the records stored in one YAML or JSON file.
///
/// A document holding a mapping is a single record labelled `label`; a
/// sequence of mappings yields `label#0`, `label#1`, ...
pub fn load_records<'s>(path: &Path, label: &str, schema: &'s ModelSchema) -> Result<Vec<Record<'s>>, SchemaError> {
    let content = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: YamlValue = serde_yaml::from_str(&content).map_err(|source| SchemaError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&document, path, label, schema)
}

fn parse_document<'s>(
    document: &YamlValue,
    path: &Path,
    label: &str,
    schema: &'s ModelSchema,
) -> Result<Vec<Record<'s>>, SchemaError> {
    let not_a_mapping = || SchemaError::NotAMapping {
        path: path.to_path_buf(),
    };

    match document {
        YamlValue::Mapping(mapping) => Ok(vec![Record::from_mapping(schema, label.to_string(), mapping)?]),
        YamlValue::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mapping = item.as_mapping().ok_or_else(not_a_mapping)?;
                Record::from_mapping(schema, format!("{}#{}", label, i), mapping)
            })
            .collect(),
        _ => Err(not_a_mapping()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::builder::field;
    use crate::schema::tests::post_schema;
    use serde_yaml::from_str;
    use std::io::Write;

    fn parse<'s>(schema: &'s ModelSchema, yaml: &str) -> Result<Vec<Record<'s>>, SchemaError> {
        let document: YamlValue = from_str(yaml).unwrap();
        parse_document(&document, Path::new("posts.yaml"), "posts.yaml", schema)
    }

    #[test]
    fn test_single_record() {
        let schema = post_schema();
        let records = parse(&schema, "title: Hello\nrating: 4.5\nextra: ignored").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label(), "posts.yaml");
        assert_eq!(records[0].get("rating"), Some(&Value::Double(4.5)));
        assert_eq!(records[0].get("extra"), None);
    }

    #[test]
    fn test_sequence_of_records() {
        let schema = post_schema();
        let records = parse(&schema, "- title: a\n- title: b\n  status: draft").unwrap();
        let labels: Vec<_> = records.iter().map(Record::label).collect();
        assert_eq!(labels, vec!["posts.yaml#0", "posts.yaml#1"]);
        assert_eq!(records[1].get("status"), Some(&Value::Enum("draft".to_string())));
    }

    #[test]
    fn test_rejects_scalar_documents() {
        let schema = post_schema();
        assert!(matches!(parse(&schema, "just text"), Err(SchemaError::NotAMapping { .. })));
        assert!(matches!(parse(&schema, "- 1\n- 2"), Err(SchemaError::NotAMapping { .. })));
    }

    #[test]
    fn test_resolver_distinguishes_unset_from_unknown() {
        let schema = post_schema();
        let records = parse(&schema, "title: Hello\nrating: null").unwrap();
        let record = &records[0];

        assert!(!field("rating").ne(1).evaluate(record).unwrap());
        assert!(field("title").begins_with("He").evaluate(record).unwrap());
        assert_eq!(
            field("author").eq("x").evaluate(record).unwrap_err(),
            EvaluationError::FieldNotFound("author".to_string())
        );
    }

    #[test]
    fn test_load_json_file() {
        let schema = post_schema();
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"title": "a", "draftCount": 2}}, {{"title": "b"}}]"#).unwrap();

        let records = load_records(file.path(), "posts.json", &schema).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("draftCount"), Some(&Value::Int(2)));
    }
}
