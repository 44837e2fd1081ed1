use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, FirestoreError>;

/// Errors produced while unwrapping wire values and populating destinations.
///
/// Every variant raised inside a value tree carries the rendered [`FieldPath`](crate::firestore::FieldPath)
/// of the offending field. Destinations may be left partially populated when
/// an assignment error is returned.
#[derive(Debug, Error)]
pub enum FirestoreError {
	/// A field value is not a single-key tagged object.
	#[error("malformed tagged value at {path}: {detail}")]
	MalformedTag {
		/// Field path of the value.
		path: String,
		/// What was found instead.
		detail: String,
	},
	/// The tag key is not one of the known wire discriminators.
	#[error("unsupported tag {tag:?} at {path} (raw value {raw})")]
	UnsupportedTag {
		/// Field path of the value.
		path: String,
		/// Unrecognized tag key.
		tag: String,
		/// Raw JSON payload under the tag.
		raw: String,
	},
	/// A map or array body is missing its inner container key.
	#[error("{container} at {path} has no usable {key:?} entry")]
	Shape {
		/// Field path of the container.
		path: String,
		/// Container tag (`mapValue` or `arrayValue`).
		container: &'static str,
		/// Expected inner key (`fields` or `values`).
		key: &'static str,
	},
	/// A known tag or leaf carried a payload that could not be converted.
	#[error("invalid {kind} payload at {path}: {reason}")]
	InvalidPayload {
		/// Field path of the value.
		path: String,
		/// Tag or leaf kind being decoded.
		kind: &'static str,
		/// Conversion failure detail.
		reason: String,
	},
	/// The native value cannot populate the destination kind.
	#[error("type mismatch at {path}: cannot use {got} to populate {expected}")]
	TypeMismatch {
		/// Field path of the destination.
		path: String,
		/// Destination kind.
		expected: &'static str,
		/// Native value kind.
		got: &'static str,
	},
	/// A numeric value does not fit the destination width.
	#[error("value {value} overflows {target} at {path}")]
	Overflow {
		/// Field path of the destination.
		path: String,
		/// Rendered source value.
		value: String,
		/// Destination numeric type.
		target: &'static str,
	},
	/// The destination type opted out of assignment.
	#[error("unsupported destination {type_name} at {path}")]
	UnsupportedDestination {
		/// Field path of the destination.
		path: String,
		/// Destination type name.
		type_name: &'static str,
	},
	/// Container nesting exceeded the configured limit.
	#[error("decode depth exceeded at {path} (max={max_depth})")]
	DepthExceeded {
		/// Field path where the limit was hit.
		path: String,
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// A record field carries an invalid naming tag.
	#[error("invalid field tag {tag:?} on {record}.{field}: {reason}")]
	InvalidTag {
		/// Record type name.
		record: &'static str,
		/// Declared field name.
		field: &'static str,
		/// Raw tag text.
		tag: String,
		/// Parse failure detail.
		reason: String,
	},
	/// Field path expression syntax is invalid.
	#[error("invalid field path: {path}")]
	InvalidFieldPath {
		/// Unparsed path text.
		path: String,
	},
	/// The document envelope has no `fields` mapping.
	#[error("document {name:?} has no fields")]
	MissingFields {
		/// Document resource name, possibly empty.
		name: String,
	},
	/// Envelope JSON failed to deserialize.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
}
