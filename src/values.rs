use crate::error::EvaluationError;
use crate::model::FieldResolver;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Counts the distinct values `field` holds across `records`. Unset values
/// are not counted.
pub fn collect_values<M: FieldResolver>(records: &[M], field: &str) -> Result<HashMap<String, usize>, EvaluationError> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(value) = record.field_value(field)? else {
            continue;
        };
        *counts.entry(value.to_string()).or_default() += 1;
    }

    Ok(counts)
}

/// One line per distinct value, ordered by value. With `show_count` each
/// line carries its count and lines rank by count, highest first.
pub fn format_values(counts: HashMap<String, usize>, show_count: bool) -> Vec<String> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

    if !show_count {
        return entries.into_iter().map(|(value, _)| value).collect();
    }

    // Stable, so equal counts stay in value order.
    entries.sort_by_key(|&(_, count)| Reverse(count));
    entries
        .into_iter()
        .map(|(value, count)| format!("{}: {}", value, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::schema::tests::post_schema;
    use serde_yaml::{from_str, Mapping};

    fn record<'s>(schema: &'s crate::schema::ModelSchema, yaml: &str) -> Record<'s> {
        let mapping: Mapping = from_str(yaml).unwrap();
        Record::from_mapping(schema, "test".to_string(), &mapping).unwrap()
    }

    #[test]
    fn test_collect_values() {
        let schema = post_schema();
        let records = vec![
            record(&schema, "status: published"),
            record(&schema, "status: draft"),
            record(&schema, "status: published"),
            record(&schema, "title: no status"),
        ];

        let counts = collect_values(&records, "status").unwrap();
        assert_eq!(counts.get("published"), Some(&2));
        assert_eq!(counts.get("draft"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_unknown_field() {
        let schema = post_schema();
        let records = vec![record(&schema, "title: a")];
        assert!(collect_values(&records, "author").is_err());
    }

    #[test]
    fn test_format_values() {
        let counts = HashMap::from([("b".to_string(), 1), ("a".to_string(), 1), ("c".to_string(), 3)]);
        assert_eq!(format_values(counts.clone(), false), vec!["a", "b", "c"]);
        assert_eq!(format_values(counts, true), vec!["c: 3", "a: 1", "b: 1"]);
    }

    #[test]
    fn test_count_ties_keep_value_order() {
        let counts = HashMap::from([
            ("2024-05-01".to_string(), 2),
            ("2024-01-01".to_string(), 2),
            ("2023-12-31".to_string(), 1),
            ("2025-01-01".to_string(), 4),
        ]);
        assert_eq!(
            format_values(counts, true),
            vec!["2025-01-01: 4", "2024-01-01: 2", "2024-05-01: 2", "2023-12-31: 1"]
        );
    }
}
