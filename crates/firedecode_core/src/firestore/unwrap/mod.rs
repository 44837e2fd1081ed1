use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::firestore::{DecodeOptions, FieldPath, FirestoreError, LatLng, Map, Result, Value, WireTag, zero_timestamp};

/// Unwrap a document `fields` mapping with default options.
pub fn unwrap_fields(input: &JsonMap<String, JsonValue>) -> Result<Map> {
	unwrap_fields_with(input, &DecodeOptions::default())
}

/// Unwrap a document `fields` mapping into a native map.
///
/// A mapping whose only entry is a bare `mapValue` body is returned as that
/// map; a lone bare `arrayValue` body is unwrapped under the `arrayValue` key.
/// The first malformed field aborts the call.
pub fn unwrap_fields_with(input: &JsonMap<String, JsonValue>, opt: &DecodeOptions) -> Result<Map> {
	log::trace!("unwrapping {} top-level fields", input.len());
	Unwrapper::new(opt).fields(input, 0)
}

/// Unwrap one tagged value such as `{"integerValue": "7"}`.
pub fn unwrap_value(tagged: &JsonValue, opt: &DecodeOptions) -> Result<Value> {
	Unwrapper::new(opt).tagged(tagged, 0)
}

struct Unwrapper<'o> {
	opt: &'o DecodeOptions,
	path: FieldPath,
}

impl<'o> Unwrapper<'o> {
	fn new(opt: &'o DecodeOptions) -> Self {
		Self { opt, path: FieldPath::root() }
	}

	fn fields(&mut self, input: &JsonMap<String, JsonValue>, depth: u32) -> Result<Map> {
		self.check_depth(depth)?;

		if let Some((key, JsonValue::Object(body))) = single_entry(input) {
			match WireTag::from_key(key) {
				Some(WireTag::Map) if is_container_body(body, "fields") => {
					return self.map_body(body, depth);
				}
				Some(WireTag::Array) if is_container_body(body, "values") => {
					self.path.push_key(key);
					let items = self.array_body(body, depth + 1)?;
					self.path.pop();

					let mut out = Map::with_capacity(1);
					out.insert(key.clone(), Value::Array(items));
					return Ok(out);
				}
				_ => {}
			}
		}

		let mut out = Map::with_capacity(input.len());
		for (key, tagged) in input {
			self.path.push_key(key);
			let value = self.tagged(tagged, depth)?;
			self.path.pop();
			out.insert(key.clone(), value);
		}
		Ok(out)
	}

	fn tagged(&mut self, tagged: &JsonValue, depth: u32) -> Result<Value> {
		let JsonValue::Object(entries) = tagged else {
			return Err(self.malformed(format!("expected a tagged object, found {}", json_kind(tagged))));
		};
		let Some((key, payload)) = single_entry(entries) else {
			return Err(self.malformed(format!("expected exactly one tag, found {} keys", entries.len())));
		};
		let Some(tag) = WireTag::from_key(key) else {
			return Err(FirestoreError::UnsupportedTag {
				path: self.path.to_string(),
				tag: key.clone(),
				raw: payload.to_string(),
			});
		};

		match tag {
			WireTag::Map => {
				let JsonValue::Object(body) = payload else {
					return Err(self.shape(WireTag::Map, "fields"));
				};
				self.map_body(body, depth + 1).map(Value::Map)
			}
			WireTag::Array => {
				let JsonValue::Object(body) = payload else {
					return Err(self.shape(WireTag::Array, "values"));
				};
				self.array_body(body, depth + 1).map(Value::Array)
			}
			flat => self.flat(flat, payload),
		}
	}

	fn map_body(&mut self, body: &JsonMap<String, JsonValue>, depth: u32) -> Result<Map> {
		match body.get("fields") {
			Some(JsonValue::Object(fields)) => self.fields(fields, depth),
			None if body.is_empty() => Ok(Map::new()),
			_ => Err(self.shape(WireTag::Map, "fields")),
		}
	}

	fn array_body(&mut self, body: &JsonMap<String, JsonValue>, depth: u32) -> Result<Vec<Value>> {
		self.check_depth(depth)?;

		let values = match body.get("values") {
			Some(JsonValue::Array(values)) => values,
			None if body.is_empty() => return Ok(Vec::new()),
			_ => return Err(self.shape(WireTag::Array, "values")),
		};

		let mut out = Vec::with_capacity(values.len());
		for (index, element) in values.iter().enumerate() {
			self.path.push_index(index);
			out.push(self.array_element(element, depth)?);
			self.path.pop();
		}
		Ok(out)
	}

	/// Flat tagged elements unwrap directly; anything else is a nested fields mapping.
	fn array_element(&mut self, element: &JsonValue, depth: u32) -> Result<Value> {
		let JsonValue::Object(entries) = element else {
			return Err(self.malformed(format!("array elements must be objects, found {}", json_kind(element))));
		};
		let flat = single_entry(entries).and_then(|(key, payload)| WireTag::from_key(key).filter(|tag| tag.is_flat()).map(|tag| (tag, payload)));
		match flat {
			Some((tag, payload)) => self.flat(tag, payload),
			None => self.fields(entries, depth).map(Value::Map),
		}
	}

	fn flat(&self, tag: WireTag, payload: &JsonValue) -> Result<Value> {
		match (tag, payload) {
			(WireTag::Null, _) => Ok(Value::Null),
			(WireTag::String | WireTag::Reference, JsonValue::String(text)) => Ok(Value::String(text.clone())),
			(WireTag::Boolean, JsonValue::Bool(flag)) => Ok(Value::Bool(*flag)),
			(WireTag::Integer, _) => self.integer(payload).map(Value::Integer),
			(WireTag::Double, _) => self.double(payload).map(Value::Double),
			(WireTag::Bytes, JsonValue::String(encoded)) => BASE64
				.decode(encoded)
				.map(Value::Bytes)
				.map_err(|err| self.invalid(tag, err.to_string())),
			(WireTag::Timestamp, JsonValue::Null) => Ok(Value::Timestamp(zero_timestamp())),
			(WireTag::Timestamp, JsonValue::String(text)) => parse_timestamp(text)
				.map(Value::Timestamp)
				.map_err(|reason| self.invalid(tag, reason)),
			(WireTag::GeoPoint, JsonValue::Null) => Ok(Value::GeoPoint(LatLng::default())),
			(WireTag::GeoPoint, JsonValue::Object(point)) => self.geo_point(point).map(Value::GeoPoint),
			(_, other) => Err(self.invalid(tag, format!("unexpected {} payload", json_kind(other)))),
		}
	}

	fn integer(&self, payload: &JsonValue) -> Result<i64> {
		match payload {
			JsonValue::Number(number) => {
				if let Some(value) = number.as_i64() {
					return Ok(value);
				}
				number
					.as_f64()
					.and_then(integral_i64)
					.ok_or_else(|| self.invalid(WireTag::Integer, format!("{number} is not a 64-bit integer")))
			}
			JsonValue::String(text) => text
				.parse::<i64>()
				.map_err(|err| self.invalid(WireTag::Integer, format!("{text:?}: {err}"))),
			other => Err(self.invalid(WireTag::Integer, format!("unexpected {} payload", json_kind(other)))),
		}
	}

	fn double(&self, payload: &JsonValue) -> Result<f64> {
		match payload {
			JsonValue::Number(number) => number
				.as_f64()
				.ok_or_else(|| self.invalid(WireTag::Double, format!("{number} is not representable"))),
			JsonValue::String(text) => text
				.parse::<f64>()
				.map_err(|err| self.invalid(WireTag::Double, format!("{text:?}: {err}"))),
			other => Err(self.invalid(WireTag::Double, format!("unexpected {} payload", json_kind(other)))),
		}
	}

	fn geo_point(&self, point: &JsonMap<String, JsonValue>) -> Result<LatLng> {
		let coordinate = |name: &str| {
			point
				.get(name)
				.and_then(JsonValue::as_f64)
				.ok_or_else(|| self.invalid(WireTag::GeoPoint, format!("{name} is missing or not a number")))
		};
		Ok(LatLng {
			latitude: coordinate("latitude")?,
			longitude: coordinate("longitude")?,
		})
	}

	fn check_depth(&self, depth: u32) -> Result<()> {
		if depth >= self.opt.max_depth {
			return Err(FirestoreError::DepthExceeded {
				path: self.path.to_string(),
				max_depth: self.opt.max_depth,
			});
		}
		Ok(())
	}

	fn malformed(&self, detail: String) -> FirestoreError {
		FirestoreError::MalformedTag {
			path: self.path.to_string(),
			detail,
		}
	}

	fn shape(&self, container: WireTag, key: &'static str) -> FirestoreError {
		FirestoreError::Shape {
			path: self.path.to_string(),
			container: container.key(),
			key,
		}
	}

	fn invalid(&self, tag: WireTag, reason: String) -> FirestoreError {
		FirestoreError::InvalidPayload {
			path: self.path.to_string(),
			kind: tag.key(),
			reason,
		}
	}
}

/// Parse RFC 3339 text into a UTC timestamp.
pub(crate) fn parse_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, String> {
	DateTime::parse_from_rfc3339(text)
		.map(|parsed| parsed.with_timezone(&Utc))
		.map_err(|err| format!("{text:?}: {err}"))
}

/// Exact `i64` for an integral, in-range float.
pub(crate) fn integral_i64(value: f64) -> Option<i64> {
	const LIMIT: f64 = 9_223_372_036_854_775_808.0;
	if value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value) {
		Some(value as i64)
	} else {
		None
	}
}

fn single_entry(entries: &JsonMap<String, JsonValue>) -> Option<(&String, &JsonValue)> {
	if entries.len() == 1 { entries.iter().next() } else { None }
}

fn is_container_body(body: &JsonMap<String, JsonValue>, key: &str) -> bool {
	body.is_empty() || body.contains_key(key)
}

fn json_kind(value: &JsonValue) -> &'static str {
	match value {
		JsonValue::Null => "null",
		JsonValue::Bool(_) => "bool",
		JsonValue::Number(_) => "number",
		JsonValue::String(_) => "string",
		JsonValue::Array(_) => "array",
		JsonValue::Object(_) => "object",
	}
}
