/// Firestore v1 REST wire types.
///
/// Documents come back as `{"name", "fields", "createTime", "updateTime"}`
/// where every field value is a single-key object naming its type
/// (`{"stringValue": "x"}`, `{"integerValue": "3"}`, ...). These map to plain
/// JSON in both directions so the rest of the crate never sees typed values.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl FirestoreDocument {
    /// Plain JSON object of the document's fields.
    pub fn into_json(self) -> Value {
        Value::Object(
            self.fields
                .into_iter()
                .map(|(k, v)| (k, v.into_json()))
                .collect(),
        )
    }

    /// Body for a write of the given fields.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| (k.clone(), FirestoreValue::from_json(v)))
                .collect(),
            ..Default::default()
        }
    }
}

/// One typed Firestore value; serde's external tagging matches the wire format.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue(Option<String>),
    BooleanValue(bool),
    /// int64 travels as a decimal string.
    IntegerValue(String),
    DoubleValue(f64),
    /// RFC 3339 text.
    TimestampValue(String),
    StringValue(String),
    /// Base64 text.
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// Empty arrays come back as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
}

impl FirestoreValue {
    pub fn into_json(self) -> Value {
        match self {
            FirestoreValue::NullValue(_) => Value::Null,
            FirestoreValue::BooleanValue(b) => Value::Bool(b),
            FirestoreValue::IntegerValue(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(s)),
            FirestoreValue::DoubleValue(d) => Number::from_f64(d).map(Value::Number).unwrap_or(Value::Null),
            FirestoreValue::TimestampValue(s)
            | FirestoreValue::StringValue(s)
            | FirestoreValue::BytesValue(s)
            | FirestoreValue::ReferenceValue(s) => Value::String(s),
            FirestoreValue::GeoPointValue(p) => {
                serde_json::json!({ "latitude": p.latitude, "longitude": p.longitude })
            }
            FirestoreValue::ArrayValue(a) => {
                Value::Array(a.values.into_iter().map(FirestoreValue::into_json).collect())
            }
            FirestoreValue::MapValue(m) => Value::Object(
                m.fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_json()))
                    .collect(),
            ),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FirestoreValue::NullValue(None),
            Value::Bool(b) => FirestoreValue::BooleanValue(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FirestoreValue::IntegerValue(i.to_string()),
                None => FirestoreValue::DoubleValue(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => FirestoreValue::StringValue(s.clone()),
            Value::Array(items) => FirestoreValue::ArrayValue(ArrayValue {
                values: items.iter().map(FirestoreValue::from_json).collect(),
            }),
            Value::Object(map) => FirestoreValue::MapValue(MapValue {
                fields: map
                    .iter()
                    .map(|(k, v)| (k.clone(), FirestoreValue::from_json(v)))
                    .collect(),
            }),
        }
    }
}
