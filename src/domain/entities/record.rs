//! Field extraction from loosely typed records.
//!
//! Records arrive as JSON values, either parsed from a JSON/YAML file or built
//! from a database row. Numbers may be stored as strings and vice versa, so the
//! accessors coerce the way a hand-edited data file expects.

use serde_json::{Map, Value};

use crate::error::{EntityError, ValidationError};

/// A record that has been checked to be a mapping.
pub struct Record<'a> {
    entity: &'static str,
    fields: &'a Map<String, Value>,
}

impl<'a> Record<'a> {
    /// Wraps `value`, failing with [`EntityError::UnsupportedType`] unless it is a mapping.
    pub fn new(entity: &'static str, value: &'a Value) -> Result<Self, EntityError> {
        match value {
            Value::Object(fields) => Ok(Self { entity, fields }),
            other => Err(EntityError::UnsupportedType {
                entity,
                found: type_name(other),
            }),
        }
    }

    /// Integer field; absent or null yields `default`.
    pub fn integer_or(&self, field: &'static str, default: i64) -> Result<i64, EntityError> {
        match self.get(field) {
            None => Ok(default),
            Some(value) => self.integer_value(field, value),
        }
    }

    /// Required integer field.
    pub fn integer(&self, field: &'static str) -> Result<i64, EntityError> {
        let value = self.require(field)?;
        self.integer_value(field, value)
    }

    /// Required text field. Numbers and booleans are rendered as text.
    pub fn text(&self, field: &'static str) -> Result<String, EntityError> {
        let value = self.require(field)?;
        scalar_text(value)
            .ok_or_else(|| ValidationError::new(field, "must be a scalar value").into())
    }

    /// Optional text field; absent or null yields an empty string.
    pub fn optional_text(&self, field: &'static str) -> Result<String, EntityError> {
        match self.get(field) {
            None => Ok(String::new()),
            Some(value) => scalar_text(value)
                .ok_or_else(|| ValidationError::new(field, "must be a scalar value").into()),
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn require(&self, field: &'static str) -> Result<&'a Value, EntityError> {
        self.get(field).ok_or(EntityError::MissingField {
            entity: self.entity,
            field,
        })
    }

    fn integer_value(&self, field: &'static str, value: &Value) -> Result<i64, EntityError> {
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| ValidationError::new(field, "must be an integer").into())
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Splits a `;`-delimited record, requiring between `min` and `max` fields.
pub(crate) fn split_delimited<'s>(
    entity: &'static str,
    line: &'s str,
    fields: &[&'static str],
    min: usize,
) -> Result<Vec<&'s str>, EntityError> {
    let parts: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(';').collect();
    if parts.len() < min {
        return Err(EntityError::MissingField {
            entity,
            field: fields[parts.len()],
        });
    }
    if parts.len() > fields.len() {
        return Err(ValidationError::new(
            "record",
            format!("expected at most {} fields, got {}", fields.len(), parts.len()),
        )
        .into());
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_mapping_is_unsupported() {
        let value = json!([1, 2]);
        let err = Record::new("client", &value).err().unwrap();
        assert_eq!(
            err,
            EntityError::UnsupportedType {
                entity: "client",
                found: "sequence"
            }
        );
    }

    #[test]
    fn test_integer_coercion() {
        let value = json!({"a": 3, "b": "4", "c": "x", "d": null});
        let record = Record::new("client", &value).unwrap();

        assert_eq!(record.integer("a").unwrap(), 3);
        assert_eq!(record.integer("b").unwrap(), 4);
        assert!(record.integer("c").is_err());
        assert_eq!(record.integer_or("d", 0).unwrap(), 0);
        assert_eq!(record.integer_or("missing", 0).unwrap(), 0);
    }

    #[test]
    fn test_text_coercion_and_missing() {
        let value = json!({"income": 7.5, "name": "Bond"});
        let record = Record::new("security", &value).unwrap();

        assert_eq!(record.text("income").unwrap(), "7.5");
        assert_eq!(record.text("name").unwrap(), "Bond");
        assert!(matches!(
            record.text("security_type"),
            Err(EntityError::MissingField { field: "security_type", .. })
        ));
        assert_eq!(record.optional_text("end_date").unwrap(), "");
    }

    #[test]
    fn test_split_delimited_bounds() {
        let fields = ["id", "name", "kind"];
        assert_eq!(
            split_delimited("x", "1;a;b", &fields, 3).unwrap(),
            vec!["1", "a", "b"]
        );
        assert!(matches!(
            split_delimited("x", "1;a", &fields, 3),
            Err(EntityError::MissingField { field: "kind", .. })
        ));
        assert!(split_delimited("x", "1;a;b;c", &fields, 3).is_err());
    }
}
