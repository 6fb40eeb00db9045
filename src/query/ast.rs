use super::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Predicate {
    Compare(Comparison),
    And { children: Vec<Predicate> },
    Or { children: Vec<Predicate> },
    Not { child: Box<Predicate> },
    /// `true` is `all`, `false` is `none`.
    Constant { value: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: String,
    pub operator: QueryOperator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "operand", rename_all = "camelCase")]
pub enum QueryOperator {
    Eq(Value),
    Ne(Value),
    Lt(Value),
    Le(Value),
    Gt(Value),
    Ge(Value),
    Contains(String),
    NotContains(String),
    BeginsWith(String),
    Between { start: Value, end: Value },
}

impl QueryOperator {
    pub fn name(&self) -> &'static str {
        match self {
            QueryOperator::Eq(_) => "eq",
            QueryOperator::Ne(_) => "ne",
            QueryOperator::Lt(_) => "lt",
            QueryOperator::Le(_) => "le",
            QueryOperator::Gt(_) => "gt",
            QueryOperator::Ge(_) => "ge",
            QueryOperator::Contains(_) => "contains",
            QueryOperator::NotContains(_) => "notContains",
            QueryOperator::BeginsWith(_) => "beginsWith",
            QueryOperator::Between { .. } => "between",
        }
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            QueryOperator::Lt(_)
                | QueryOperator::Le(_)
                | QueryOperator::Gt(_)
                | QueryOperator::Ge(_)
                | QueryOperator::Between { .. }
        )
    }

    pub fn is_substring(&self) -> bool {
        matches!(
            self,
            QueryOperator::Contains(_) | QueryOperator::NotContains(_) | QueryOperator::BeginsWith(_)
        )
    }
}

// Renders predicates in the text query syntax accepted by `query::parse`.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare(cmp) => write!(f, "{}", cmp),
            Predicate::And { children } => write_group(f, "AND", children),
            Predicate::Or { children } => write_group(f, "OR", children),
            Predicate::Not { child } => write!(f, "NOT ({})", child),
            Predicate::Constant { value: true } => f.write_str("ALL"),
            Predicate::Constant { value: false } => f.write_str("NONE"),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, keyword: &str, children: &[Predicate]) -> fmt::Result {
    f.write_str("(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", keyword)?;
        }
        write!(f, "{}", child)?;
    }
    f.write_str(")")
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.field;
        match &self.operator {
            QueryOperator::Eq(v) => write!(f, "{} = {}", field, Literal(v)),
            QueryOperator::Ne(v) => write!(f, "{} != {}", field, Literal(v)),
            QueryOperator::Lt(v) => write!(f, "{} < {}", field, Literal(v)),
            QueryOperator::Le(v) => write!(f, "{} <= {}", field, Literal(v)),
            QueryOperator::Gt(v) => write!(f, "{} > {}", field, Literal(v)),
            QueryOperator::Ge(v) => write!(f, "{} >= {}", field, Literal(v)),
            QueryOperator::Contains(s) => write!(f, "{} contains {}", field, Quoted(s)),
            QueryOperator::NotContains(s) => write!(f, "{} not contains {}", field, Quoted(s)),
            QueryOperator::BeginsWith(s) => write!(f, "{} beginsWith {}", field, Quoted(s)),
            QueryOperator::Between { start, end } => {
                write!(f, "{} between {} and {}", field, Literal(start), Literal(end))
            }
        }
    }
}

struct Literal<'a>(&'a Value);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) | Value::Enum(s) => write!(f, "{}", Quoted(s)),
            Value::Double(d) if d.fract() == 0.0 && d.is_finite() => write!(f, "{:.1}", d),
            other => write!(f, "{}", other),
        }
    }
}

/// A double-quoted string with `"` and `\` backslash-escaped.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.0.chars() {
            if matches!(c, '"' | '\\') {
                f.write_str("\\")?;
            }
            write!(f, "{}", c)?;
        }
        f.write_str("\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_query_syntax() {
        let predicate = Predicate::Or {
            children: vec![
                Predicate::Compare(Comparison {
                    field: "rating".to_string(),
                    operator: QueryOperator::Between {
                        start: Value::Int(1),
                        end: Value::Double(3.0),
                    },
                }),
                Predicate::Not {
                    child: Box::new(Predicate::Compare(Comparison {
                        field: "title".to_string(),
                        operator: QueryOperator::BeginsWith("Draft".to_string()),
                    })),
                },
            ],
        };
        assert_eq!(
            predicate.to_string(),
            r#"(rating between 1 and 3.0 OR NOT (title beginsWith "Draft"))"#
        );
    }

    #[test]
    fn test_display_escapes_quotes_and_backslashes() {
        let cmp = |operator| Comparison {
            field: "title".to_string(),
            operator,
        };
        assert_eq!(
            cmp(QueryOperator::Eq(Value::from(r#"say "hi""#))).to_string(),
            r#"title = "say \"hi\"""#
        );
        assert_eq!(
            cmp(QueryOperator::Contains(r"C:\dir".to_string())).to_string(),
            r#"title contains "C:\\dir""#
        );
        assert_eq!(cmp(QueryOperator::Gt(Value::Double(f64::NAN))).to_string(), "title > NaN");
    }

    #[test]
    fn test_yaml_shape() {
        let yaml = r#"
type: and
children:
  - type: compare
    field: rating
    operator:
      op: ge
      operand:
        type: double
        value: 4.5
  - type: constant
    value: true
"#;
        let predicate: Predicate = serde_yaml::from_str(yaml).unwrap();
        let Predicate::And { children } = predicate else {
            panic!("Expected and group");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0],
            Predicate::Compare(Comparison {
                field: "rating".to_string(),
                operator: QueryOperator::Ge(Value::Double(4.5)),
            })
        );
        assert_eq!(children[1], Predicate::Constant { value: true });
    }
}
