use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Native mapping, in source key order.
pub type Map = IndexMap<String, Value>;

/// Unix seconds of `0001-01-01T00:00:00Z`.
const ZERO_TIMESTAMP_SECS: i64 = -62_135_596_800;

/// Geographic point as a latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
	/// Latitude in degrees.
	pub latitude: f64,
	/// Longitude in degrees.
	pub longitude: f64,
}

/// Decoded native value with all wire discriminators removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
	/// `nullValue`
	#[default]
	Null,
	/// `booleanValue`
	Bool(bool),
	/// Plain strings and opaque document-reference paths.
	String(String),
	/// `integerValue`
	Integer(i64),
	/// `doubleValue`, including non-finite values.
	Double(f64),
	/// Decoded `bytesValue`.
	Bytes(Vec<u8>),
	/// `timestampValue` normalized to UTC.
	Timestamp(DateTime<Utc>),
	/// `geoPointValue`
	GeoPoint(LatLng),
	/// `arrayValue` elements in order.
	Array(Vec<Value>),
	/// `mapValue` entries in source order.
	Map(Map),
}

impl Value {
	/// Short kind label used in diagnostics.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::String(_) => "string",
			Value::Integer(_) => "integer",
			Value::Double(_) => "double",
			Value::Bytes(_) => "bytes",
			Value::Timestamp(_) => "timestamp",
			Value::GeoPoint(_) => "geo point",
			Value::Array(_) => "array",
			Value::Map(_) => "map",
		}
	}

	/// True for [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Borrow string content.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::String(text) => Some(text),
			_ => None,
		}
	}

	/// Integer content; doubles are not converted.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Integer(value) => Some(*value),
			_ => None,
		}
	}

	/// Numeric content widened to `f64`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Double(value) => Some(*value),
			Value::Integer(value) => Some(*value as f64),
			_ => None,
		}
	}

	/// Borrow map content.
	pub fn as_map(&self) -> Option<&Map> {
		match self {
			Value::Map(entries) => Some(entries),
			_ => None,
		}
	}

	/// Borrow array content.
	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Value::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Look up a map entry by key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_map().and_then(|entries| entries.get(key))
	}
}

impl From<Map> for Value {
	fn from(entries: Map) -> Self {
		Value::Map(entries)
	}
}

/// Zero timestamp (`0001-01-01T00:00:00Z`), used for absent `timestampValue` payloads.
pub fn zero_timestamp() -> DateTime<Utc> {
	DateTime::from_timestamp(ZERO_TIMESTAMP_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
