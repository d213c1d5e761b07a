//! Conversion of driver BSON values into plain JSON at the persistence boundary.

use mongodb::bson::Bson;
use serde_json::{Map, Number, Value as JsonValue};

/// Map a BSON value onto JSON.
///
/// Structural kinds (finite doubles, strings, booleans, null, integers,
/// arrays, documents) keep their shape. Everything else is stringified.
pub fn normalize_bson(value: &Bson) -> JsonValue {
    match value {
        Bson::Null => JsonValue::Null,
        Bson::Boolean(b) => JsonValue::Bool(*b),
        Bson::Int32(i) => JsonValue::Number((*i).into()),
        Bson::Int64(i) => JsonValue::Number((*i).into()),
        Bson::Double(f) => match Number::from_f64(*f) {
            Some(n) => JsonValue::Number(n),
            None => JsonValue::String(f.to_string()),
        },
        Bson::String(s) => JsonValue::String(s.clone()),
        Bson::Array(items) => JsonValue::Array(items.iter().map(normalize_bson).collect()),
        Bson::Document(doc) => {
            let map: Map<String, JsonValue> = doc
                .iter()
                .map(|(k, v)| (k.clone(), normalize_bson(v)))
                .collect();
            JsonValue::Object(map)
        }
        Bson::ObjectId(oid) => JsonValue::String(oid.to_hex()),
        Bson::DateTime(dt) => JsonValue::String(
            dt.try_to_rfc3339_string()
                .unwrap_or_else(|_| dt.timestamp_millis().to_string()),
        ),
        other => JsonValue::String(other.to_string()),
    }
}
