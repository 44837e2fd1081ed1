use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use indexmap::IndexMap;

use crate::firestore::{FirestoreError, LeafKind, Map, RecordSlot, Result, Value};

/// Declared field of a record, as produced by [`record!`](crate::record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
	/// Rust field name.
	pub name: &'static str,
	/// Raw naming tag, `name[,option]*` or `-`.
	pub tag: Option<&'static str>,
	/// Leaf classification of the field type.
	pub leaf: Option<LeafKind>,
}

impl FieldDecl {
	/// Untagged field.
	pub const fn new(name: &'static str) -> Self {
		Self { name, tag: None, leaf: None }
	}

	/// Attach a naming tag.
	pub const fn with_tag(mut self, tag: &'static str) -> Self {
		self.tag = Some(tag);
		self
	}

	/// Attach a leaf classification.
	pub const fn with_leaf(mut self, leaf: Option<LeafKind>) -> Self {
		self.leaf = leaf;
		self
	}
}

/// Options trailing the name in a naming tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagOptions {
	/// `omitempty`; only meaningful when encoding.
	pub omit_empty: bool,
}

/// Parse a naming tag.
///
/// Returns `None` for the skip tag `-`, otherwise the (possibly empty) name
/// and its options.
pub fn parse_tag(tag: &str) -> std::result::Result<Option<(&str, TagOptions)>, String> {
	if tag == "-" {
		return Ok(None);
	}

	let mut parts = tag.split(',');
	let name = parts.next().unwrap_or_default().trim();
	let mut options = TagOptions::default();
	for option in parts {
		match option.trim() {
			"omitempty" => options.omit_empty = true,
			"" => {}
			other => return Err(format!("unknown option {other:?}")),
		}
	}
	Ok(Some((name, options)))
}

/// One assignable field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
	/// Rust field name.
	pub name: &'static str,
	/// Key matched against source maps.
	pub external_name: String,
	/// Declared position, passed back to [`RecordSlot::field`].
	pub index: usize,
	/// Leaf classification.
	pub leaf: Option<LeafKind>,
	/// Encoding-only `omitempty` marker.
	pub omit_empty: bool,
}

/// Resolved field list of one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
	/// Record type name.
	pub record: &'static str,
	/// Assignable fields in declaration order.
	pub fields: Vec<FieldShape>,
}

/// A source entry bound to a record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldMatch<'s, 'v> {
	/// Target field.
	pub field: &'s FieldShape,
	/// Source key that matched.
	pub key: &'v str,
	/// Source value.
	pub value: &'v Value,
	/// True when `key` equals the external name exactly.
	pub exact: bool,
}

impl RecordShape {
	/// Resolve the declared fields of `record`.
	pub fn build(record: &'static str, decls: &[FieldDecl]) -> Result<Self> {
		let mut fields = Vec::with_capacity(decls.len());
		for (index, decl) in decls.iter().enumerate() {
			let (name, options) = match decl.tag {
				None => (decl.name, TagOptions::default()),
				Some(tag) => match parse_tag(tag) {
					Ok(Some((name, options))) => (name, options),
					Ok(None) => continue,
					Err(reason) => {
						return Err(FirestoreError::InvalidTag {
							record,
							field: decl.name,
							tag: tag.to_owned(),
							reason,
						});
					}
				},
			};
			let external_name = if name.is_empty() { decl.name } else { name };

			if fields.iter().any(|field: &FieldShape| field.external_name == external_name) {
				return Err(FirestoreError::InvalidTag {
					record,
					field: decl.name,
					tag: decl.tag.unwrap_or(decl.name).to_owned(),
					reason: format!("duplicate field name {external_name:?}"),
				});
			}

			fields.push(FieldShape {
				name: decl.name,
				external_name: external_name.to_owned(),
				index,
				leaf: decl.leaf,
				omit_empty: options.omit_empty,
			});
		}
		Ok(Self { record, fields })
	}

	/// Field bound to a source key: exact name first, then case-insensitive.
	pub fn find(&self, key: &str) -> Option<&FieldShape> {
		self.find_exact(key).or_else(|| self.find_folded(key))
	}

	fn find_exact(&self, key: &str) -> Option<&FieldShape> {
		self.fields.iter().find(|field| field.external_name == key)
	}

	fn find_folded(&self, key: &str) -> Option<&FieldShape> {
		let folded = key.to_lowercase();
		self.fields.iter().find(|field| field.external_name.to_lowercase() == folded)
	}

	/// Bind source entries to fields.
	///
	/// Each field receives at most one entry. An exact key beats a
	/// case-insensitive one regardless of source order; otherwise the first
	/// matching key wins. Matches are returned in source order.
	pub fn match_keys<'s, 'v>(&'s self, entries: &'v Map) -> Vec<FieldMatch<'s, 'v>> {
		let mut bound: IndexMap<usize, FieldMatch<'s, 'v>> = IndexMap::new();
		for (key, value) in entries {
			let Some(field) = self.find(key) else {
				continue;
			};
			let exact = field.external_name == *key;
			let candidate = FieldMatch { field, key, value, exact };
			match bound.get_mut(&field.index) {
				Some(existing) if exact && !existing.exact => *existing = candidate,
				Some(_) => {}
				None => {
					bound.insert(field.index, candidate);
				}
			}
		}
		bound.into_values().collect()
	}
}

static GLOBAL: LazyLock<FieldCache> = LazyLock::new(FieldCache::new);

/// Thread-safe per-type cache of resolved record shapes.
#[derive(Debug, Default)]
pub struct FieldCache {
	shapes: RwLock<HashMap<TypeId, Arc<RecordShape>>>,
}

impl FieldCache {
	/// Empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Process-wide cache used when no other cache is supplied.
	pub fn global() -> &'static FieldCache {
		&GLOBAL
	}

	/// Shape of `record`, computed at most once per record type.
	pub fn resolve(&self, record: &dyn RecordSlot) -> Result<Arc<RecordShape>> {
		let key = record.record_type();
		if let Some(shape) = self.shapes.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
			return Ok(Arc::clone(shape));
		}

		let mut shapes = self.shapes.write().unwrap_or_else(PoisonError::into_inner);
		if let Some(shape) = shapes.get(&key) {
			return Ok(Arc::clone(shape));
		}

		log::debug!("resolving field shape for {}", record.record_name());
		let shape = Arc::new(RecordShape::build(record.record_name(), &record.declared_fields())?);
		shapes.insert(key, Arc::clone(&shape));
		Ok(shape)
	}

	/// Number of cached record types.
	pub fn len(&self) -> usize {
		self.shapes.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	/// True when nothing has been resolved yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drop every cached shape.
	pub fn clear(&self) {
		self.shapes.write().unwrap_or_else(PoisonError::into_inner).clear();
	}
}

#[cfg(test)]
mod tests;
