//! WASM bindings for the TDF parser.
//!
//! Exposes `parseTree()`, `toJson()` and `fromJson()` to JavaScript via
//! wasm-bindgen. Config arguments are optional partial objects; missing
//! options take their defaults. Parse failures throw an `Error` that also
//! carries `row`, `col`, `pos` and `reason` properties.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tdf_json::JsonConfig;
use tdf_parser::{Document, ParseError, Parser, ParserConfig};
use wasm_bindgen::prelude::*;

/// Parse TDF source into a `{ fields, sections }` tree.
#[wasm_bindgen(js_name = parseTree)]
pub fn parse_tree(source: &str, config: JsValue) -> Result<JsValue, JsValue> {
    let config: ParserConfig = decode_config(config)?;
    let doc = Parser::parse(source, &config).map_err(|e| parse_error(&e))?;
    to_js(&doc)
}

/// Parse TDF source and flatten it into a plain object.
#[wasm_bindgen(js_name = toJson)]
pub fn to_json(
    source: &str,
    parser_config: JsValue,
    json_config: JsValue,
) -> Result<JsValue, JsValue> {
    let parser_config: ParserConfig = decode_config(parser_config)?;
    let json_config: JsonConfig = decode_config(json_config)?;

    let doc = Parser::parse(source, &parser_config).map_err(|e| parse_error(&e))?;
    let object = tdf_json::document_to_object(&doc, &json_config)
        .map_err(|e| JsValue::from(JsError::new(&e.to_string())))?;
    to_js(&object)
}

/// Rebuild a `{ fields, sections }` tree from a plain object.
#[wasm_bindgen(js_name = fromJson)]
pub fn from_json(object: JsValue, json_config: JsValue) -> Result<JsValue, JsValue> {
    let json_config: JsonConfig = decode_config(json_config)?;
    let value: serde_json::Value = serde_wasm_bindgen::from_value(object)
        .map_err(|e| JsValue::from(JsError::new(&e.to_string())))?;

    let doc: Document = tdf_json::from_object(&value, &json_config)
        .map_err(|e| JsValue::from(JsError::new(&e.to_string())))?;
    to_js(&doc)
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn decode_config<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from(JsError::new(&format!("Invalid config: {e}"))))
}

/// Serialize maps as plain objects rather than JS `Map`s.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from(JsError::new(&e.to_string())))
}

fn parse_error(err: &ParseError) -> JsValue {
    let js_err = js_sys::Error::new(&err.to_string());
    match set_position(&js_err, err) {
        Ok(()) => js_err.into(),
        Err(e) => e,
    }
}

fn set_position(target: &js_sys::Error, err: &ParseError) -> Result<(), JsValue> {
    js_sys::Reflect::set(target, &"reason".into(), &err.reason().into())?;
    js_sys::Reflect::set(target, &"row".into(), &JsValue::from(err.row as u32))?;
    js_sys::Reflect::set(target, &"col".into(), &JsValue::from(err.col as u32))?;
    js_sys::Reflect::set(target, &"pos".into(), &JsValue::from(err.pos as u32))?;
    Ok(())
}
