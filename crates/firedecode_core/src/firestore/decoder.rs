use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::firestore::{Assigner, DecodeOptions, Destination, FieldCache, FirestoreDocument, Map, Result, Value, unwrap_fields_with};

#[derive(Debug, Clone, Default)]
enum CacheHandle {
	#[default]
	Global,
	Shared(Arc<FieldCache>),
}

/// Reusable decode configuration: limits plus the field cache used for records.
///
/// ```
/// use std::sync::Arc;
/// use firedecode::firestore::{DecodeOptions, Decoder, FieldCache};
///
/// let cache = Arc::new(FieldCache::new());
/// let decoder = Decoder::new()
/// 	.with_options(DecodeOptions::default().with_max_depth(16))
/// 	.with_field_cache(Arc::clone(&cache));
/// assert_eq!(decoder.options().max_depth, 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
	options: DecodeOptions,
	cache: CacheHandle,
}

impl Decoder {
	/// Decoder with default options and the process-wide field cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the decode options.
	pub fn with_options(mut self, options: DecodeOptions) -> Self {
		self.options = options;
		self
	}

	/// Resolve record shapes through `cache` instead of the process-wide one.
	pub fn with_field_cache(mut self, cache: Arc<FieldCache>) -> Self {
		self.cache = CacheHandle::Shared(cache);
		self
	}

	/// Active decode options.
	pub fn options(&self) -> &DecodeOptions {
		&self.options
	}

	/// Active field cache.
	pub fn field_cache(&self) -> &FieldCache {
		match &self.cache {
			CacheHandle::Global => FieldCache::global(),
			CacheHandle::Shared(cache) => cache,
		}
	}

	/// Unwrap a `fields` mapping into a native map.
	pub fn unwrap_fields(&self, fields: &JsonMap<String, JsonValue>) -> Result<Map> {
		unwrap_fields_with(fields, &self.options)
	}

	/// Populate `dest` from a native value.
	pub fn assign<D: Destination>(&self, dest: &mut D, value: &Value) -> Result<()> {
		Assigner::new(self.field_cache(), self.options).assign(dest, value)
	}

	/// Unwrap a `fields` mapping and populate `dest` from it.
	pub fn decode_fields<D: Destination>(&self, fields: &JsonMap<String, JsonValue>, dest: &mut D) -> Result<()> {
		log::debug!("decoding {} fields into {}", fields.len(), std::any::type_name::<D>());
		let value = Value::Map(self.unwrap_fields(fields)?);
		self.assign(dest, &value)
	}

	/// Unwrap a document's fields into a native map.
	pub fn document_to_map(&self, document: &FirestoreDocument) -> Result<Map> {
		self.unwrap_fields(document.fields_or_missing()?)
	}

	/// Populate `dest` from a document's fields.
	pub fn document_to<D: Destination>(&self, document: &FirestoreDocument, dest: &mut D) -> Result<()> {
		self.decode_fields(document.fields_or_missing()?, dest)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use serde_json::json;

	use crate::firestore::{DecodeOptions, Decoder, FieldCache, FirestoreError};

	crate::record! {
		#[derive(Debug, Default)]
		struct Counter {
			count: i32,
			label: String,
		}
	}

	fn fields(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
		match value {
			serde_json::Value::Object(map) => map,
			other => panic!("expected object literal, got {other}"),
		}
	}

	#[test]
	fn decode_fields_uses_the_injected_cache() {
		let cache = Arc::new(FieldCache::new());
		let decoder = Decoder::new().with_field_cache(Arc::clone(&cache));

		let mut counter = Counter::default();
		decoder
			.decode_fields(
				&fields(json!({ "count": { "integerValue": "41" }, "label": { "stringValue": "hits" } })),
				&mut counter,
			)
			.expect("decodes");

		assert_eq!((counter.count, counter.label.as_str()), (41, "hits"));
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn options_limit_unwrap_depth() {
		let decoder = Decoder::new().with_options(DecodeOptions::default().with_max_depth(1));
		let input = fields(json!({ "m": { "mapValue": { "fields": { "x": { "nullValue": null } } } } }));

		let err = decoder.unwrap_fields(&input).expect_err("nested map exceeds depth 1");
		assert!(matches!(err, FirestoreError::DepthExceeded { max_depth: 1, .. }), "{err}");
	}
}
