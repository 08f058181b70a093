//! Section tree → JSON object.

use serde_json::{Map, Value};
use tdf_parser::{Document, Section};

use crate::{JsonConfig, SerializeError};

/// Convert the whole document, starting at its root.
pub fn document_to_object(doc: &Document, config: &JsonConfig) -> Result<Value, SerializeError> {
    tracing::debug!(config = ?config, "converting document to object");
    to_object(doc.root(), config)
}

/// Convert one section and everything below it.
///
/// Fields come first, then child sections, each in insertion order. A child
/// section whose key is already taken fails with
/// [`SerializeError::KeyCollision`].
pub fn to_object(section: Section<'_>, config: &JsonConfig) -> Result<Value, SerializeError> {
    let mut object = Map::new();

    for (key, value) in section.fields() {
        object.insert(key.to_string(), Value::String(value.to_string()));
    }

    for (name, child) in section.sections() {
        let key = config.section_key(name);
        if object.contains_key(&key) {
            tracing::debug!(key = %key, "key collision");
            return Err(SerializeError::KeyCollision { key });
        }
        let value = to_object(child, config)?;
        object.insert(key, value);
    }

    Ok(Value::Object(object))
}
