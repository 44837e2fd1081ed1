use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::firestore::{Decoder, Destination, FieldPath, FirestoreError, Map, Result};

/// Document snapshot as carried by a change event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
	/// Full resource name, `projects/…/documents/<collection>/<id>`.
	#[serde(default)]
	pub name: String,
	/// Tagged field values.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fields: Option<JsonMap<String, JsonValue>>,
	/// Creation time.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub create_time: Option<DateTime<Utc>>,
	/// Last update time.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub update_time: Option<DateTime<Utc>>,
}

impl FirestoreDocument {
	/// Last segment of the resource name.
	pub fn id(&self) -> &str {
		self.name.rsplit('/').next().unwrap_or_default()
	}

	/// True when the snapshot carries neither a name nor fields.
	pub fn is_empty(&self) -> bool {
		self.name.is_empty() && self.fields.is_none()
	}

	/// Unwrap the fields into a native map.
	pub fn to_map(&self) -> Result<Map> {
		Decoder::new().document_to_map(self)
	}

	/// Unwrap the fields and populate `dest` from them.
	pub fn data_to<D: Destination>(&self, dest: &mut D) -> Result<()> {
		Decoder::new().document_to(self, dest)
	}

	pub(crate) fn fields_or_missing(&self) -> Result<&JsonMap<String, JsonValue>> {
		self.fields.as_ref().ok_or_else(|| FirestoreError::MissingFields { name: self.name.clone() })
	}
}

/// Field paths touched by an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMask {
	/// Changed field paths in Firestore path syntax.
	#[serde(default)]
	pub field_paths: Vec<String>,
}

/// Document change event payload: previous snapshot, new snapshot, and update mask.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreCloudEvent {
	/// Snapshot before the change; empty for creates.
	#[serde(default)]
	pub old_value: FirestoreDocument,
	/// Snapshot after the change; empty for deletes.
	#[serde(default)]
	pub value: FirestoreDocument,
	/// Paths changed by an update.
	#[serde(default)]
	pub update_mask: UpdateMask,
}

impl FirestoreCloudEvent {
	/// Parse an event from raw JSON bytes.
	pub fn from_slice(bytes: &[u8]) -> Result<Self> {
		log::trace!("parsing {} byte change event", bytes.len());
		Ok(serde_json::from_slice(bytes)?)
	}

	/// New snapshot.
	pub fn document(&self) -> &FirestoreDocument {
		&self.value
	}

	/// Previous snapshot, when the event carries one.
	pub fn old_document(&self) -> Option<&FirestoreDocument> {
		if self.old_value.is_empty() { None } else { Some(&self.old_value) }
	}

	/// Unwrap the new snapshot into a native map.
	pub fn to_map(&self) -> Result<Map> {
		self.value.to_map()
	}

	/// Populate `dest` from the new snapshot.
	pub fn data_to<D: Destination>(&self, dest: &mut D) -> Result<()> {
		self.value.data_to(dest)
	}

	/// Populate `dest` from the previous snapshot.
	pub fn old_data_to<D: Destination>(&self, dest: &mut D) -> Result<()> {
		self.old_value.data_to(dest)
	}

	/// Parsed update-mask paths.
	pub fn changed_fields(&self) -> Result<Vec<FieldPath>> {
		self.update_mask.field_paths.iter().map(|path| FieldPath::parse(path)).collect()
	}
}

#[cfg(test)]
mod tests;
