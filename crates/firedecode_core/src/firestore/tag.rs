/// Wire-level type discriminator of a tagged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireTag {
	/// `stringValue`
	String,
	/// `booleanValue`
	Boolean,
	/// `integerValue`
	Integer,
	/// `doubleValue`
	Double,
	/// `bytesValue`
	Bytes,
	/// `nullValue`
	Null,
	/// `referenceValue`
	Reference,
	/// `timestampValue`
	Timestamp,
	/// `geoPointValue`
	GeoPoint,
	/// `mapValue`
	Map,
	/// `arrayValue`
	Array,
}

impl WireTag {
	/// Every known tag, flat tags first.
	pub const ALL: [WireTag; 11] = [
		WireTag::String,
		WireTag::Boolean,
		WireTag::Integer,
		WireTag::Double,
		WireTag::Bytes,
		WireTag::Null,
		WireTag::Reference,
		WireTag::Timestamp,
		WireTag::GeoPoint,
		WireTag::Map,
		WireTag::Array,
	];

	/// Resolve a JSON object key to a tag.
	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|tag| tag.key() == key)
	}

	/// JSON object key for this tag.
	pub fn key(self) -> &'static str {
		match self {
			WireTag::String => "stringValue",
			WireTag::Boolean => "booleanValue",
			WireTag::Integer => "integerValue",
			WireTag::Double => "doubleValue",
			WireTag::Bytes => "bytesValue",
			WireTag::Null => "nullValue",
			WireTag::Reference => "referenceValue",
			WireTag::Timestamp => "timestampValue",
			WireTag::GeoPoint => "geoPointValue",
			WireTag::Map => "mapValue",
			WireTag::Array => "arrayValue",
		}
	}

	/// Tags whose payload holds no nested tagged values.
	pub fn is_flat(self) -> bool {
		!matches!(self, WireTag::Map | WireTag::Array)
	}
}
