use std::collections::{BTreeMap, HashMap};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_dynamo::AttributeValue;
use serde_json::{json, Map, Value};

/// A row image: column name to typed value.
pub type Image = HashMap<String, AttributeValue>;

/// Erases the type tag of `value` and returns the string form of what it wraps.
///
/// Scalars return their literal text, booleans render as `True`/`False` and binary
/// values as base64. Sets become a compact JSON array, nested `L`/`M` values become
/// the compact JSON of their typed contents with map keys sorted.
pub fn flat_string(value: AttributeValue) -> String {
    match value {
        AttributeValue::S(s) | AttributeValue::N(s) => s,
        AttributeValue::B(bytes) => STANDARD.encode(bytes),
        AttributeValue::Bool(b) | AttributeValue::Null(b) => bool_string(b).to_owned(),
        AttributeValue::Ss(set) | AttributeValue::Ns(set) => Value::from(set).to_string(),
        AttributeValue::Bs(set) => Value::from(encode_all(set)).to_string(),
        AttributeValue::L(list) => Value::from_iter(list.into_iter().map(typed_json)).to_string(),
        AttributeValue::M(map) => Value::Object(typed_map(map)).to_string(),
    }
}

fn bool_string(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

fn encode_all(set: Vec<Vec<u8>>) -> Vec<String> {
    set.into_iter().map(|bytes| STANDARD.encode(bytes)).collect()
}

fn typed_map(map: HashMap<String, AttributeValue>) -> Map<String, Value> {
    let sorted: BTreeMap<String, Value> = map
        .into_iter()
        .map(|(key, value)| (key, typed_json(value)))
        .collect();
    sorted.into_iter().collect()
}

/// DynamoDB JSON form of a nested value, e.g. `{"N":"1"}`.
fn typed_json(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => json!({ "S": s }),
        AttributeValue::N(n) => json!({ "N": n }),
        AttributeValue::B(bytes) => json!({ "B": STANDARD.encode(bytes) }),
        AttributeValue::Bool(b) => json!({ "BOOL": b }),
        AttributeValue::Null(b) => json!({ "NULL": b }),
        AttributeValue::Ss(set) => json!({ "SS": set }),
        AttributeValue::Ns(set) => json!({ "NS": set }),
        AttributeValue::Bs(set) => json!({ "BS": encode_all(set) }),
        AttributeValue::L(list) => {
            json!({ "L": list.into_iter().map(typed_json).collect::<Vec<_>>() })
        }
        AttributeValue::M(map) => json!({ "M": typed_map(map) }),
    }
}

/// Flattens every column of an image into its string form.
pub fn flatten_image(image: Image) -> BTreeMap<String, String> {
    image
        .into_iter()
        .map(|(column, value)| (column, flat_string(value)))
        .collect()
}
