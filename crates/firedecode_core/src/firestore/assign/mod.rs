use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use uuid::Uuid;

use crate::firestore::unwrap::{integral_i64, parse_timestamp};
use crate::firestore::{
	DecodeOptions, Destination, FieldCache, FieldPath, FirestoreError, FloatSlot, IntSlot, LatLng, LeafKind, Map, RecordSlot, Result, SeqSlot, Slot, Value,
};

/// Populate `dest` from `value` with default options and the global field cache.
pub fn assign<D: Destination>(dest: &mut D, value: &Value) -> Result<()> {
	Assigner::new(FieldCache::global(), DecodeOptions::default()).assign(dest, value)
}

/// Recursive writer of native values into destinations.
///
/// The first failure aborts the walk; fields written before it keep their new
/// values.
pub struct Assigner<'c> {
	cache: &'c FieldCache,
	opt: DecodeOptions,
	path: FieldPath,
}

impl<'c> Assigner<'c> {
	/// Assigner resolving record shapes through `cache`.
	pub fn new(cache: &'c FieldCache, opt: DecodeOptions) -> Self {
		Self {
			cache,
			opt,
			path: FieldPath::root(),
		}
	}

	/// Populate `dest` from `value`.
	pub fn assign(&mut self, dest: &mut dyn Destination, value: &Value) -> Result<()> {
		log::trace!("assigning {} value", value.kind_name());
		self.path = FieldPath::root();
		self.value_into(dest, value, 0)
	}

	fn value_into(&mut self, dest: &mut dyn Destination, value: &Value, depth: u32) -> Result<()> {
		let slot = dest.slot();
		if value.is_null() {
			reset_nullable(slot);
			return Ok(());
		}

		match slot {
			Slot::Timestamp(target) => {
				*target = match value {
					Value::Timestamp(at) => *at,
					Value::String(text) => parse_timestamp(text).map_err(|reason| self.invalid(LeafKind::Timestamp, reason))?,
					other => return Err(self.mismatch(LeafKind::Timestamp.name(), other)),
				};
			}
			Slot::GeoPoint(target) => {
				*target = match value {
					Value::GeoPoint(point) => *point,
					Value::Map(entries) => self.geo_point(entries)?,
					other => return Err(self.mismatch(LeafKind::GeoPoint.name(), other)),
				};
			}
			Slot::Uuid(target) => {
				*target = match value {
					Value::String(text) => Uuid::parse_str(text).map_err(|err| self.invalid(LeafKind::Uuid, err.to_string()))?,
					Value::Bytes(raw) => Uuid::from_slice(raw).map_err(|err| self.invalid(LeafKind::Uuid, err.to_string()))?,
					other => return Err(self.mismatch(LeafKind::Uuid.name(), other)),
				};
			}
			Slot::Bytes(target) => match value {
				Value::Bytes(raw) => target.set_bytes(raw),
				Value::String(encoded) => {
					let raw = BASE64.decode(encoded).map_err(|err| self.invalid(LeafKind::Bytes, err.to_string()))?;
					target.set_bytes(&raw);
				}
				other => return Err(self.mismatch(LeafKind::Bytes.name(), other)),
			},
			Slot::Bool(target) => match value {
				Value::Bool(flag) => *target = *flag,
				other => return Err(self.mismatch("bool", other)),
			},
			Slot::String(target) => match value {
				Value::String(text) => target.clone_from(text),
				other => return Err(self.mismatch("string", other)),
			},
			Slot::Int(target) => self.integer(target, value)?,
			Slot::Float(target) => self.float(target, value)?,
			Slot::Seq(target) => {
				let Value::Array(items) = value else {
					return Err(self.mismatch("sequence", value));
				};
				self.check_depth(depth)?;
				self.sequence(target, items, depth + 1)?;
			}
			Slot::Map(target) => {
				let Value::Map(entries) = value else {
					return Err(self.mismatch("map", value));
				};
				self.check_depth(depth)?;
				for (key, item) in entries {
					self.path.push_key(key);
					target.insert_with(key, &mut |fresh| self.value_into(fresh, item, depth + 1))?;
					self.path.pop();
				}
			}
			Slot::Indirect(target) => self.value_into(target.pointee(), value, depth)?,
			Slot::Record(target) => {
				let Value::Map(entries) = value else {
					return Err(self.mismatch(target.record_name(), value));
				};
				self.check_depth(depth)?;
				self.record(target, entries, depth + 1)?;
			}
			Slot::Dynamic(target) => match target.pointee() {
				Some(inner) => self.value_into(inner, value, depth)?,
				None => target.replace(value),
			},
			Slot::Unsupported(type_name) => {
				return Err(FirestoreError::UnsupportedDestination {
					path: self.path.to_string(),
					type_name,
				});
			}
		}
		Ok(())
	}

	fn sequence(&mut self, target: &mut dyn SeqSlot, items: &[Value], depth: u32) -> Result<()> {
		if target.is_growable() {
			target.resize(items.len());
		} else {
			for index in items.len()..target.len() {
				target.reset(index);
			}
		}

		let filled = items.len().min(target.len());
		for (index, item) in items.iter().take(filled).enumerate() {
			self.path.push_index(index);
			self.value_into(target.element(index), item, depth)?;
			self.path.pop();
		}
		Ok(())
	}

	fn record(&mut self, target: &mut dyn RecordSlot, entries: &Map, depth: u32) -> Result<()> {
		let shape = self.cache.resolve(target)?;
		for bound in shape.match_keys(entries) {
			let Some(field) = target.field(bound.field.index) else {
				continue;
			};
			self.path.push_key(bound.field.name);
			self.value_into(field, bound.value, depth)?;
			self.path.pop();
		}
		Ok(())
	}

	fn integer(&self, mut target: IntSlot<'_>, value: &Value) -> Result<()> {
		let stored = match value {
			Value::Integer(whole) => target.store(*whole),
			Value::Double(real) if real.fract() == 0.0 => match integral_i64(*real) {
				Some(whole) => target.store(whole),
				None => integral_u64(*real).is_some_and(|whole| target.store_u64(whole)),
			},
			other => return Err(self.mismatch(target.type_name(), other)),
		};
		if !stored {
			let shown: &dyn std::fmt::Display = match value {
				Value::Double(real) => real,
				Value::Integer(whole) => whole,
				other => return Err(self.mismatch(target.type_name(), other)),
			};
			return Err(self.overflow(shown, target.type_name()));
		}
		Ok(())
	}

	fn float(&self, mut target: FloatSlot<'_>, value: &Value) -> Result<()> {
		let Some(real) = value.as_f64() else {
			return Err(self.mismatch(target.type_name(), value));
		};
		if !target.store(real) {
			return Err(self.overflow(&real, target.type_name()));
		}
		Ok(())
	}

	fn geo_point(&self, entries: &Map) -> Result<LatLng> {
		let coordinate = |name: &str| {
			entries
				.get(name)
				.and_then(Value::as_f64)
				.ok_or_else(|| self.invalid(LeafKind::GeoPoint, format!("{name} is missing or not a number")))
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

	fn mismatch(&self, expected: &'static str, got: &Value) -> FirestoreError {
		FirestoreError::TypeMismatch {
			path: self.path.to_string(),
			expected,
			got: got.kind_name(),
		}
	}

	fn overflow(&self, value: &dyn std::fmt::Display, target: &'static str) -> FirestoreError {
		FirestoreError::Overflow {
			path: self.path.to_string(),
			value: value.to_string(),
			target,
		}
	}

	fn invalid(&self, kind: LeafKind, reason: String) -> FirestoreError {
		FirestoreError::InvalidPayload {
			path: self.path.to_string(),
			kind: kind.name(),
			reason,
		}
	}
}

/// Explicit null empties nullable destinations and leaves everything else alone.
fn reset_nullable(slot: Slot<'_>) {
	match slot {
		Slot::Indirect(target) => target.clear(),
		Slot::Map(target) => target.clear(),
		Slot::Seq(target) if target.is_growable() => target.clear(),
		Slot::Bytes(target) => target.clear_bytes(),
		Slot::Dynamic(target) => target.reset(),
		_ => {}
	}
}

/// Exact `u64` for an integral, non-negative float below 2^64.
fn integral_u64(value: f64) -> Option<u64> {
	const LIMIT: f64 = 18_446_744_073_709_551_616.0;
	if value.fract() == 0.0 && (0.0..LIMIT).contains(&value) { Some(value as u64) } else { None }
}
