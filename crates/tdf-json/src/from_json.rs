//! JSON object → section tree.
//!
//! The inverse of [`to_object`](crate::to_object): strings become fields and
//! objects become child sections, using the same key convention.

use serde_json::{Map, Value};
use tdf_parser::{is_name_char, Document, SectionId};

use crate::{kind_of, JsonConfig, SerializeError};

/// Build a document from a JSON object.
pub fn from_object(value: &Value, config: &JsonConfig) -> Result<Document, SerializeError> {
    let Value::Object(object) = value else {
        return Err(SerializeError::NotAnObject {
            kind: kind_of(value),
        });
    };

    let mut doc = Document::new();
    let root = doc.root_id();
    fill_section(&mut doc, root, object, config)?;
    tracing::debug!(sections = doc.allocated_sections(), "built document from object");
    Ok(doc)
}

fn fill_section(
    doc: &mut Document,
    id: SectionId,
    object: &Map<String, Value>,
    config: &JsonConfig,
) -> Result<(), SerializeError> {
    for (key, value) in object {
        match value {
            Value::String(text) => {
                if config.use_brackets_on_section_names && config.section_name(key).is_some() {
                    return Err(SerializeError::BracketedField { key: key.clone() });
                }
                if key.is_empty() || !is_valid_name(key) {
                    return Err(SerializeError::InvalidName { name: key.clone() });
                }
                doc.insert_field(id, key.as_str(), text.as_str());
            }
            Value::Object(child) => {
                let name = config
                    .section_name(key)
                    .ok_or_else(|| SerializeError::UnbracketedSection { key: key.clone() })?;
                if !is_valid_name(name) {
                    return Err(SerializeError::InvalidName {
                        name: name.to_string(),
                    });
                }
                let child_id = doc.insert_section(id, name);
                fill_section(doc, child_id, child, config)?;
            }
            other => {
                return Err(SerializeError::UnsupportedValue {
                    key: key.clone(),
                    kind: kind_of(other),
                });
            }
        }
    }
    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    name.chars().all(is_name_char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_to_object;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tdf_parser::{Parser, ParserConfig};

    #[test]
    fn test_nested_with_brackets() {
        let value = json!({"[CUSTOMKEYS]": {"FOO": "foo", "[sub1]": {"BAZ": "baz"}}});
        let doc = from_object(&value, &JsonConfig::default()).unwrap();
        let expected =
            Parser::parse_default("[CUSTOMKEYS] { FOO = foo; [sub1] { BAZ = baz; } }").unwrap();
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_nested_without_brackets() {
        let value = json!({"A": {"x": "1", "B": {}}});
        let config = JsonConfig::new().use_brackets_on_section_names(false);
        let doc = from_object(&value, &config).unwrap();
        let a = doc.root().section("A").unwrap();
        assert_eq!(a.field("x"), Some("1"));
        assert!(a.section("B").unwrap().is_empty());
    }

    #[test]
    fn test_root_fields_kept() {
        let doc = from_object(&json!({"VERSION": "2"}), &JsonConfig::default()).unwrap();
        assert_eq!(doc.root().field("VERSION"), Some("2"));
    }

    #[test]
    fn test_tree_object_tree() {
        let source = "[A] { B = 1; [B] { C = two words; } [] { } }";
        let doc = Parser::parse_default(source).unwrap();
        let config = JsonConfig::default();
        let object = document_to_object(&doc, &config).unwrap();
        assert_eq!(from_object(&object, &config).unwrap(), doc);
    }

    #[test]
    fn test_tree_object_tree_with_root_fields() {
        let parser_config = ParserConfig::new().allow_root_fields(true);
        let doc = Parser::parse("X = 1;\n[A] { Y = 2; }", &parser_config).unwrap();
        let config = JsonConfig::new().use_brackets_on_section_names(false);
        let object = document_to_object(&doc, &config).unwrap();
        assert_eq!(from_object(&object, &config).unwrap(), doc);
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(
            from_object(&json!(["a"]), &JsonConfig::default()),
            Err(SerializeError::NotAnObject { kind: "an array" })
        );
    }

    #[test]
    fn test_unbracketed_section() {
        assert_eq!(
            from_object(&json!({"A": {}}), &JsonConfig::default()),
            Err(SerializeError::UnbracketedSection { key: "A".into() })
        );
    }

    #[test]
    fn test_bracketed_field() {
        assert_eq!(
            from_object(&json!({"[A]": "x"}), &JsonConfig::default()),
            Err(SerializeError::BracketedField { key: "[A]".into() })
        );
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(
            from_object(&json!({"a b": "x"}), &JsonConfig::default()),
            Err(SerializeError::InvalidName { name: "a b".into() })
        );
        assert_eq!(
            from_object(&json!({"": "x"}), &JsonConfig::default()),
            Err(SerializeError::InvalidName { name: "".into() })
        );
        assert_eq!(
            from_object(&json!({"[a-b]": {}}), &JsonConfig::default()),
            Err(SerializeError::InvalidName { name: "a-b".into() })
        );
    }

    #[test]
    fn test_unsupported_values() {
        assert_eq!(
            from_object(&json!({"[A]": {"n": 1}}), &JsonConfig::default()),
            Err(SerializeError::UnsupportedValue {
                key: "n".into(),
                kind: "a number"
            })
        );
        assert_eq!(
            from_object(&json!({"flag": null}), &JsonConfig::default()),
            Err(SerializeError::UnsupportedValue {
                key: "flag".into(),
                kind: "null"
            })
        );
    }
}
