// src/utils/serialization.rs
//! Canonical signing serialization.
//!
//! Ledger nodes rebuild this exact string from a received request to check
//! its signature, so ordering, separators, boolean capitalization and the
//! attribute hashing rule must match the node byte for byte.
//!
//! The format:
//! - booleans render as `True` / `False`
//! - text renders as itself, unquoted
//! - numbers render as their source literal, except that exponents are
//!   written `e+N` / `e-N`
//! - sequences join their elements with `,`
//! - mappings render `key:value` pairs in ascending key order joined by `|`
//!
//! At the top level `signature`, `signatures` and `fees` are dropped. For
//! ATTRIB and GET_ATTR requests the `raw`, `hash` and `enc` fields are
//! replaced by the hex SHA-256 of their text.

use std::collections::HashMap;

use crate::error::SerializeError;
use crate::models::request::txn_type;
use crate::models::value::Value;
use crate::utils::crypto::hash_hex;
use crate::utils::ordered_view::OrderedView;

const SIGNATURE_FIELDS: [&str; 3] = ["signature", "fees", "signatures"];
const HASHED_ATTRIBUTE_FIELDS: [&str; 3] = ["raw", "hash", "enc"];

/// Serializes a request's JSON projection into the string that gets signed.
///
/// The request must contain an `operation` mapping with a text `type`.
pub fn serialize_for_signing(request: &Value) -> Result<String, SerializeError> {
    let operation_type = request
        .get("operation")
        .and_then(|operation| operation.get("type"))
        .and_then(Value::as_str)
        .ok_or(SerializeError::MissingOperation)?;

    serialize(request, true, operation_type)
}

/// Renders any value tree. `operation_type` selects the attribute hashing rule.
pub fn serialize(
    value: &Value,
    is_top_level: bool,
    operation_type: &str,
) -> Result<String, SerializeError> {
    match value {
        Value::Bool(true) => Ok("True".to_owned()),
        Value::Bool(false) => Ok("False".to_owned()),
        Value::Text(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Sequence(items) => {
            let parts = items
                .iter()
                .map(|item| serialize(item, false, operation_type))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join(","))
        }
        Value::Mapping(map) => serialize_mapping(map, is_top_level, operation_type),
        // Unsupported shapes render as nothing
        Value::Null => Ok(String::new()),
    }
}

fn serialize_mapping(
    map: &HashMap<String, Value>,
    is_top_level: bool,
    operation_type: &str,
) -> Result<String, SerializeError> {
    let hash_attributes = is_attribute_operation(operation_type);
    let mut pairs = Vec::with_capacity(map.len());

    for (key, value) in OrderedView::new(map).iter() {
        if is_top_level && SIGNATURE_FIELDS.contains(&key) {
            continue;
        }

        let rendered = if hash_attributes && HASHED_ATTRIBUTE_FIELDS.contains(&key) {
            let text = value
                .as_str()
                .ok_or_else(|| SerializeError::NonTextAttribute(key.to_owned()))?;
            hash_hex(text.as_bytes())
        } else {
            serialize(value, false, operation_type)?
        };

        pairs.push(format!("{key}:{rendered}"));
    }

    Ok(pairs.join("|"))
}

fn is_attribute_operation(operation_type: &str) -> bool {
    operation_type == txn_type::ATTRIB || operation_type == txn_type::GET_ATTR
}
