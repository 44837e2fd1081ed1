use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::SecondsFormat;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::firestore::{Map, Value};

impl Value {
	/// Convert to plain JSON for code that wants `serde_json` values.
	///
	/// Timestamps become RFC 3339 text in UTC, bytes become base64 text and
	/// geo points become `{latitude, longitude}` objects. Non-finite doubles
	/// have no JSON number form and are rendered as `"NaN"`, `"Infinity"` or
	/// `"-Infinity"`.
	pub fn to_json(&self) -> JsonValue {
		match self {
			Value::Null => JsonValue::Null,
			Value::Bool(flag) => JsonValue::Bool(*flag),
			Value::String(text) => JsonValue::String(text.clone()),
			Value::Integer(whole) => JsonValue::from(*whole),
			Value::Double(real) => double_to_json(*real),
			Value::Bytes(raw) => JsonValue::String(BASE64.encode(raw)),
			Value::Timestamp(at) => JsonValue::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
			Value::GeoPoint(point) => {
				let mut out = JsonMap::with_capacity(2);
				out.insert("latitude".into(), double_to_json(point.latitude));
				out.insert("longitude".into(), double_to_json(point.longitude));
				JsonValue::Object(out)
			}
			Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
			Value::Map(entries) => JsonValue::Object(map_to_json(entries)),
		}
	}
}

/// Convert a native map into a JSON object, keeping key order.
pub fn map_to_json(entries: &Map) -> JsonMap<String, JsonValue> {
	entries.iter().map(|(key, value)| (key.clone(), value.to_json())).collect()
}

fn double_to_json(real: f64) -> JsonValue {
	match Number::from_f64(real) {
		Some(number) => JsonValue::Number(number),
		None if real.is_nan() => JsonValue::String("NaN".into()),
		None if real.is_sign_positive() => JsonValue::String("Infinity".into()),
		None => JsonValue::String("-Infinity".into()),
	}
}
