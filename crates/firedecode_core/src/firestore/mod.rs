mod assign;
mod decoder;
mod destination;
mod error;
mod event;
mod fields;
mod json;
mod options;
mod path;
mod tag;
mod unwrap;
mod value;

/// Recursive value-to-destination assignment.
pub use assign::{Assigner, assign};
/// Options-and-cache facade over unwrapping and assignment.
pub use decoder::Decoder;
/// Destination model implemented by every assignable type.
pub use destination::{ByteBuffer, Destination, Dynamic, DynamicSlot, FloatSlot, IndirectSlot, IntSlot, LeafKind, MapSlot, RecordSlot, SeqSlot, Slot};
/// Error and result aliases.
pub use error::{FirestoreError, Result};
/// Change-event and document envelopes.
pub use event::{FirestoreCloudEvent, FirestoreDocument, UpdateMask};
/// Field-shape resolution and caching for record destinations.
pub use fields::{FieldCache, FieldDecl, FieldMatch, FieldShape, RecordShape, TagOptions, parse_tag};
/// JSON handoff helpers.
pub use json::map_to_json;
/// Runtime limits shared by unwrapping and assignment.
pub use options::DecodeOptions;
/// Field path parser and renderer.
pub use path::{FieldPath, PathStep};
/// Wire-level type discriminators.
pub use tag::WireTag;
/// Tagged-union unwrapping entry points.
pub use unwrap::{unwrap_fields, unwrap_fields_with, unwrap_value};
/// Native value tree types.
pub use value::{LatLng, Map, Value, zero_timestamp};

/// Unwrap `fields` and populate `dest` from the result using default options.
pub fn data_to<D: Destination>(fields: &serde_json::Map<String, serde_json::Value>, dest: &mut D) -> Result<()> {
	Decoder::new().decode_fields(fields, dest)
}
