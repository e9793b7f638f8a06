use std::collections::HashMap;

use bson::{Bson, Document as BsonDocument};
use mongovec_core::SearchResult;
use serde_json::Value;

use crate::config::MongoConfig;

/// Map one record returned by the search pipeline into a [`SearchResult`].
///
/// Metadata comes from the `metadata` sub-document when there is one;
/// otherwise every top-level field that is not the id, name, content,
/// score or vector becomes metadata.
pub(crate) fn record_to_result(record: &BsonDocument, config: &MongoConfig) -> SearchResult {
    let id = record.get("_id").map(id_to_string).unwrap_or_default();

    let name = record.get_str("name").ok().map(str::to_string);

    let content = record
        .get_str(&config.content_field)
        .unwrap_or("")
        .to_string();

    let score = record
        .get(&config.score_field)
        .and_then(number_as_f64)
        .unwrap_or(0.0) as f32;

    let metadata = match record.get_document("metadata") {
        Ok(metadata) => bson_doc_to_json_map(metadata),
        Err(_) => record
            .iter()
            .filter(|(key, _)| {
                let key = key.as_str();
                key != "_id"
                    && key != "name"
                    && key != config.content_field
                    && key != config.score_field
                    && key != config.vector_field
            })
            .map(|(k, v)| (k.clone(), bson_to_json(v)))
            .collect(),
    };

    SearchResult {
        id,
        name,
        content,
        metadata,
        score,
    }
}

fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::String(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        other => match bson_to_json(other) {
            Value::String(s) => s,
            value => value.to_string(),
        },
    }
}

fn number_as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(f) => Some(*f),
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        _ => None,
    }
}

/// Convert an embedding into a BSON array of doubles.
pub(crate) fn vector_to_bson(vector: &[f32]) -> Bson {
    Bson::Array(vector.iter().map(|v| Bson::Double(f64::from(*v))).collect())
}

/// Convert a JSON metadata map to a BSON document.
pub(crate) fn json_map_to_bson(map: &HashMap<String, Value>) -> BsonDocument {
    let mut doc = BsonDocument::new();
    for (k, v) in map {
        doc.insert(k.clone(), json_to_bson(v));
    }
    doc
}

fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Bson::Double(f)
            } else {
                Bson::Null
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(arr) => Bson::Array(arr.iter().map(json_to_bson).collect()),
        Value::Object(map) => {
            let mut doc = BsonDocument::new();
            for (k, v) in map {
                doc.insert(k.clone(), json_to_bson(v));
            }
            Bson::Document(doc)
        }
    }
}

fn bson_doc_to_json_map(doc: &BsonDocument) -> HashMap<String, Value> {
    doc.iter()
        .map(|(k, v)| (k.clone(), bson_to_json(v)))
        .collect()
}

fn bson_to_json(bson: &Bson) -> Value {
    match bson {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::Number((*i as i64).into()),
        Bson::Int64(i) => Value::Number((*i).into()),
        Bson::Double(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Array(arr) => Value::Array(arr.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(
            doc.iter()
                .map(|(k, v)| (k.clone(), bson_to_json(v)))
                .collect(),
        ),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(dt.to_string()),
        Bson::Binary(bin) => Value::String(format!("<binary {} bytes>", bin.bytes.len())),
        _ => Value::String(format!("{bson}")),
    }
}
