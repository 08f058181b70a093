//! TDF ↔ JSON conversion
//!
//! Flattens a parsed section tree into a JSON object and builds a tree back
//! from one. Fields and child sections share one object per section; child
//! sections are keyed `[Name]` by default so they cannot clash with a field
//! called `Name`.
//!
//! ```text
//! Document → to_object() → {"FOO": "foo", "[sub1]": {"BAZ": "baz"}}
//! ```

pub mod from_json;
pub mod to_json;

use serde::{Deserialize, Serialize};

pub use from_json::from_object;
pub use to_json::{document_to_object, to_object};

/// Options for mapping sections to object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonConfig {
    /// Key child sections as `[Name]` instead of `Name`.
    pub use_brackets_on_section_names: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            use_brackets_on_section_names: true,
        }
    }
}

impl JsonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_brackets_on_section_names(mut self, brackets: bool) -> Self {
        self.use_brackets_on_section_names = brackets;
        self
    }

    /// Object key for a child section called `name`.
    pub fn section_key(&self, name: &str) -> String {
        if self.use_brackets_on_section_names {
            format!("[{name}]")
        } else {
            name.to_string()
        }
    }

    /// Section name encoded by an object key, if the key has the expected shape.
    pub fn section_name<'k>(&self, key: &'k str) -> Option<&'k str> {
        if self.use_brackets_on_section_names {
            key.strip_prefix('[')?.strip_suffix(']')
        } else {
            Some(key)
        }
    }
}

/// Conversion error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    #[error("Current section already has a key named \"{key}\".")]
    KeyCollision { key: String },

    #[error("Expected a JSON object at the top level, found {kind}.")]
    NotAnObject { kind: &'static str },

    #[error("Key \"{key}\" holds an object but is not written as [Name].")]
    UnbracketedSection { key: String },

    #[error("Key \"{key}\" is written as [Name] but holds a string.")]
    BracketedField { key: String },

    #[error("\"{name}\" is not a valid name: use letters, digits and '_'.")]
    InvalidName { name: String },

    #[error("Key \"{key}\" holds {kind}; only strings and objects are allowed.")]
    UnsupportedValue { key: String, kind: &'static str },
}

/// Short description of a JSON value's type, for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_uses_brackets() {
        assert!(JsonConfig::default().use_brackets_on_section_names);
    }

    #[test]
    fn test_section_key() {
        let bracketed = JsonConfig::new();
        let bare = JsonConfig::new().use_brackets_on_section_names(false);
        assert_eq!(bracketed.section_key("sub1"), "[sub1]");
        assert_eq!(bare.section_key("sub1"), "sub1");
        assert_eq!(bracketed.section_key(""), "[]");
    }

    #[test]
    fn test_section_name() {
        let bracketed = JsonConfig::new();
        assert_eq!(bracketed.section_name("[sub1]"), Some("sub1"));
        assert_eq!(bracketed.section_name("[]"), Some(""));
        assert_eq!(bracketed.section_name("sub1"), None);
        assert_eq!(bracketed.section_name("[sub1"), None);

        let bare = JsonConfig::new().use_brackets_on_section_names(false);
        assert_eq!(bare.section_name("sub1"), Some("sub1"));
    }

    #[test]
    fn test_partial_config() {
        let config: JsonConfig =
            serde_json::from_str(r#"{"useBracketsOnSectionNames": false}"#).unwrap();
        assert_eq!(config, JsonConfig::new().use_brackets_on_section_names(false));
        let config: JsonConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, JsonConfig::default());
    }

    #[test]
    fn test_collision_message() {
        let err = SerializeError::KeyCollision { key: "A".into() };
        assert_eq!(err.to_string(), "Current section already has a key named \"A\".");
    }
}
