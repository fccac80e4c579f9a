//! On-disk document formats for file repositories.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;

use crate::error::RepositoryError;

/// Serialization format of a collection file.
///
/// Both formats hold a sequence of flat mappings with verbatim field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Format implied by a file extension (`.json`, `.yaml`, `.yml`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Parses a document into its records.
    ///
    /// Blank documents and a top-level YAML null are an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Format`] for invalid syntax, a top-level value
    /// that is not a sequence, or a sequence element that is not a mapping.
    pub fn parse(self, path: &Path, text: &str) -> Result<Vec<Value>, RepositoryError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: Value = match self {
            Self::Json => serde_json::from_str(text)
                .map_err(|e| RepositoryError::format(path, format!("invalid JSON: {e}")))?,
            Self::Yaml => serde_yaml::from_str(text)
                .map_err(|e| RepositoryError::format(path, format!("invalid YAML: {e}")))?,
        };

        let records = match document {
            Value::Array(records) => records,
            Value::Null => return Ok(Vec::new()),
            other => {
                return Err(RepositoryError::format(
                    path,
                    format!("expected a list of records, got {}", type_name(&other)),
                ));
            }
        };

        if let Some((index, bad)) = records.iter().enumerate().find(|(_, r)| !r.is_object()) {
            return Err(RepositoryError::format(
                path,
                format!("record #{index} is {}, expected a mapping", type_name(bad)),
            ));
        }

        Ok(records)
    }

    /// Renders a collection as a complete document.
    ///
    /// JSON uses 4-space indentation; both formats keep non-ASCII text as is.
    pub fn render<T: Serialize>(self, path: &Path, items: &[T]) -> Result<String, RepositoryError> {
        match self {
            Self::Json => {
                let mut out = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
                items
                    .serialize(&mut ser)
                    .map_err(|e| RepositoryError::format(path, format!("cannot encode JSON: {e}")))?;
                out.push(b'\n');
                String::from_utf8(out)
                    .map_err(|e| RepositoryError::format(path, format!("cannot encode JSON: {e}")))
            }
            Self::Yaml => serde_yaml::to_string(items)
                .map_err(|e| RepositoryError::format(path, format!("cannot encode YAML: {e}"))),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> &'static Path {
        Path::new("clients.json")
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/clients.JSON")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path(Path::new("clients.yml")), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_path(Path::new("clients.csv")), None);
        assert_eq!(FileFormat::from_path(Path::new("clients")), None);
    }

    #[test]
    fn test_blank_document_is_empty() {
        assert!(FileFormat::Json.parse(path(), "").unwrap().is_empty());
        assert!(FileFormat::Yaml.parse(path(), "  \n").unwrap().is_empty());
        assert!(FileFormat::Yaml.parse(path(), "~").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json() {
        let err = FileFormat::Json.parse(path(), "[{\"client_id\": 1,").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_wrong_shape() {
        assert!(FileFormat::Json.parse(path(), "{\"a\": 1}").unwrap_err().is_format());
        assert!(FileFormat::Json.parse(path(), "[1, 2]").unwrap_err().is_format());
        assert!(FileFormat::Yaml.parse(path(), "just text").unwrap_err().is_format());
    }

    #[test]
    fn test_yaml_sequence_of_mappings() {
        let text = "- client_id: 1\n  name: Иванов Иван\n- client_id: 2\n  name: Petrov Petr\n";
        let records = FileFormat::Yaml.parse(path(), text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], "Иванов Иван");
        assert_eq!(records[1]["client_id"], 2);
    }

    #[test]
    fn test_json_rendering_uses_four_spaces_and_keeps_unicode() {
        let text = FileFormat::Json
            .render(path(), &[json!({"name": "Ромашка"})])
            .unwrap();
        assert_eq!(text, "[\n    {\n        \"name\": \"Ромашка\"\n    }\n]\n");
    }

    #[test]
    fn test_yaml_rendering_round_trips() {
        let items = vec![json!({"security_id": 1, "name": "ОФЗ 26238", "income": 7.1})];
        let text = FileFormat::Yaml.render(path(), &items).unwrap();
        assert!(text.contains("ОФЗ 26238"));
        assert_eq!(FileFormat::Yaml.parse(path(), &text).unwrap(), items);
    }
}
