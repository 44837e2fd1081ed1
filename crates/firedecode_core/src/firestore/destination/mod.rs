use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::firestore::{FieldDecl, LatLng, Result, Value};

/// Leaf types decoded as a unit and never recursed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
	/// `DateTime<Utc>`
	Timestamp,
	/// [`LatLng`]
	GeoPoint,
	/// [`Uuid`]
	Uuid,
	/// `Vec<u8>`
	Bytes,
}

impl LeafKind {
	/// Short kind label used in diagnostics.
	pub fn name(self) -> &'static str {
		match self {
			LeafKind::Timestamp => "timestamp",
			LeafKind::GeoPoint => "geo point",
			LeafKind::Uuid => "uuid",
			LeafKind::Bytes => "bytes",
		}
	}
}

/// A type that can be populated from a native [`Value`].
///
/// Implementations expose a mutable view of themselves as a [`Slot`]; the
/// assigner dispatches exhaustively over that view. Records get their
/// implementation from the [`record!`](crate::record) macro.
pub trait Destination {
	/// Mutable shape view of this destination.
	fn slot(&mut self) -> Slot<'_>;

	/// Leaf classification of this type, if any.
	fn leaf_kind() -> Option<LeafKind>
	where
		Self: Sized,
	{
		None
	}

	/// Build an element from one byte of a byte buffer.
	///
	/// Only `u8` returns `Some`, which makes `Vec<u8>` a byte-buffer leaf
	/// rather than a sequence of integers.
	fn from_byte_element(_byte: u8) -> Option<Self>
	where
		Self: Sized,
	{
		None
	}
}

/// Mutable view of a destination, one variant per assignable kind.
pub enum Slot<'a> {
	/// `bool`
	Bool(&'a mut bool),
	/// `String`
	String(&'a mut String),
	/// Any primitive integer.
	Int(IntSlot<'a>),
	/// `f32` or `f64`.
	Float(FloatSlot<'a>),
	/// Timestamp leaf.
	Timestamp(&'a mut DateTime<Utc>),
	/// Geographic point leaf.
	GeoPoint(&'a mut LatLng),
	/// UUID leaf.
	Uuid(&'a mut Uuid),
	/// Byte-buffer leaf.
	Bytes(&'a mut dyn ByteBuffer),
	/// Growable or fixed-length sequence.
	Seq(&'a mut dyn SeqSlot),
	/// String-keyed mapping.
	Map(&'a mut dyn MapSlot),
	/// Nullable indirection such as `Option<T>`.
	Indirect(&'a mut dyn IndirectSlot),
	/// Record with declared fields.
	Record(&'a mut dyn RecordSlot),
	/// Open destination replaced by the nearest native equivalent.
	Dynamic(&'a mut dyn DynamicSlot),
	/// The type opted out of assignment; carries its name.
	Unsupported(&'static str),
}

impl Slot<'_> {
	/// Short kind label used in diagnostics.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Slot::Bool(_) => "bool",
			Slot::String(_) => "string",
			Slot::Int(int) => int.type_name(),
			Slot::Float(float) => float.type_name(),
			Slot::Timestamp(_) => LeafKind::Timestamp.name(),
			Slot::GeoPoint(_) => LeafKind::GeoPoint.name(),
			Slot::Uuid(_) => LeafKind::Uuid.name(),
			Slot::Bytes(_) => LeafKind::Bytes.name(),
			Slot::Seq(_) => "sequence",
			Slot::Map(_) => "map",
			Slot::Indirect(_) => "option",
			Slot::Record(record) => record.record_name(),
			Slot::Dynamic(_) => "dynamic",
			Slot::Unsupported(name) => *name,
		}
	}
}

/// Integer destination of a specific width.
pub enum IntSlot<'a> {
	/// `i8`
	I8(&'a mut i8),
	/// `i16`
	I16(&'a mut i16),
	/// `i32`
	I32(&'a mut i32),
	/// `i64`
	I64(&'a mut i64),
	/// `isize`
	Isize(&'a mut isize),
	/// `u8`
	U8(&'a mut u8),
	/// `u16`
	U16(&'a mut u16),
	/// `u32`
	U32(&'a mut u32),
	/// `u64`
	U64(&'a mut u64),
	/// `usize`
	Usize(&'a mut usize),
}

impl IntSlot<'_> {
	/// Store `value` if it fits; returns `false` on overflow and leaves the target untouched.
	pub fn store(&mut self, value: i64) -> bool {
		fn put<T: TryFrom<i64>>(target: &mut T, value: i64) -> bool {
			match T::try_from(value) {
				Ok(narrowed) => {
					*target = narrowed;
					true
				}
				Err(_) => false,
			}
		}

		match self {
			IntSlot::I8(target) => put(&mut **target, value),
			IntSlot::I16(target) => put(&mut **target, value),
			IntSlot::I32(target) => put(&mut **target, value),
			IntSlot::I64(target) => put(&mut **target, value),
			IntSlot::Isize(target) => put(&mut **target, value),
			IntSlot::U8(target) => put(&mut **target, value),
			IntSlot::U16(target) => put(&mut **target, value),
			IntSlot::U32(target) => put(&mut **target, value),
			IntSlot::U64(target) => put(&mut **target, value),
			IntSlot::Usize(target) => put(&mut **target, value),
		}
	}

	/// Store an unsigned value beyond `i64::MAX` if it fits.
	pub fn store_u64(&mut self, value: u64) -> bool {
		fn put<T: TryFrom<u64>>(target: &mut T, value: u64) -> bool {
			match T::try_from(value) {
				Ok(narrowed) => {
					*target = narrowed;
					true
				}
				Err(_) => false,
			}
		}

		match self {
			IntSlot::I8(target) => put(&mut **target, value),
			IntSlot::I16(target) => put(&mut **target, value),
			IntSlot::I32(target) => put(&mut **target, value),
			IntSlot::I64(target) => put(&mut **target, value),
			IntSlot::Isize(target) => put(&mut **target, value),
			IntSlot::U8(target) => put(&mut **target, value),
			IntSlot::U16(target) => put(&mut **target, value),
			IntSlot::U32(target) => put(&mut **target, value),
			IntSlot::U64(target) => put(&mut **target, value),
			IntSlot::Usize(target) => put(&mut **target, value),
		}
	}

	/// Rust type name of the target.
	pub fn type_name(&self) -> &'static str {
		match self {
			IntSlot::I8(_) => "i8",
			IntSlot::I16(_) => "i16",
			IntSlot::I32(_) => "i32",
			IntSlot::I64(_) => "i64",
			IntSlot::Isize(_) => "isize",
			IntSlot::U8(_) => "u8",
			IntSlot::U16(_) => "u16",
			IntSlot::U32(_) => "u32",
			IntSlot::U64(_) => "u64",
			IntSlot::Usize(_) => "usize",
		}
	}
}

/// Float destination of a specific width.
pub enum FloatSlot<'a> {
	/// `f32`
	F32(&'a mut f32),
	/// `f64`
	F64(&'a mut f64),
}

impl FloatSlot<'_> {
	/// Store `value` if it fits; finite values beyond `f32::MAX` overflow `f32`.
	pub fn store(&mut self, value: f64) -> bool {
		match self {
			FloatSlot::F32(target) => {
				if value.is_finite() && value.abs() > f64::from(f32::MAX) {
					return false;
				}
				**target = value as f32;
				true
			}
			FloatSlot::F64(target) => {
				**target = value;
				true
			}
		}
	}

	/// Rust type name of the target.
	pub fn type_name(&self) -> &'static str {
		match self {
			FloatSlot::F32(_) => "f32",
			FloatSlot::F64(_) => "f64",
		}
	}
}

/// Byte-buffer leaf storage.
pub trait ByteBuffer {
	/// Replace the contents.
	fn set_bytes(&mut self, bytes: &[u8]);
	/// Empty the buffer.
	fn clear_bytes(&mut self);
}

/// Ordered sequence storage.
pub trait SeqSlot {
	/// Growable sequences are resized to the source length.
	fn is_growable(&self) -> bool;
	/// Current element count.
	fn len(&self) -> usize;
	/// True when there are no elements.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
	/// Resize a growable sequence, keeping the existing prefix.
	fn resize(&mut self, len: usize);
	/// Reset one element to its default value.
	fn reset(&mut self, index: usize);
	/// Empty a growable sequence.
	fn clear(&mut self);
	/// Element at `index`, which must be below [`SeqSlot::len`].
	fn element(&mut self, index: usize) -> &mut dyn Destination;
}

/// String-keyed mapping storage.
pub trait MapSlot {
	/// Remove every entry.
	fn clear(&mut self);
	/// Build a fresh value, let `fill` populate it, then insert it under `key`,
	/// replacing any existing entry.
	fn insert_with(&mut self, key: &str, fill: &mut dyn FnMut(&mut dyn Destination) -> Result<()>) -> Result<()>;
}

/// Nullable indirection storage.
pub trait IndirectSlot {
	/// Reset to empty.
	fn clear(&mut self);
	/// Pointee, allocated with its default value when empty.
	fn pointee(&mut self) -> &mut dyn Destination;
}

/// Record storage with a declared field table.
pub trait RecordSlot {
	/// Cache key for the record's field shape.
	fn record_type(&self) -> TypeId;
	/// Record type name.
	fn record_name(&self) -> &'static str;
	/// Declared fields in declaration order.
	fn declared_fields(&self) -> Vec<FieldDecl>;
	/// Field at a declared index.
	fn field(&mut self, index: usize) -> Option<&mut dyn Destination>;
}

/// Open destination storage.
pub trait DynamicSlot {
	/// Destination this value already forwards to, if any.
	fn pointee(&mut self) -> Option<&mut dyn Destination> {
		None
	}
	/// Replace the whole value with the nearest native equivalent of `value`.
	fn replace(&mut self, value: &Value);
	/// Return to the empty state after an explicit null.
	fn reset(&mut self) {
		self.replace(&Value::Null);
	}
}

/// Open destination that holds a native value, or forwards to a caller-supplied target.
///
/// Non-null values are forwarded into a [`Dynamic::Target`]; an explicit null
/// drops the target and leaves [`Dynamic::Empty`].
#[derive(Default)]
pub enum Dynamic {
	/// Native value held directly.
	#[default]
	Empty,
	/// Value replaced wholesale on assignment.
	Value(Value),
	/// Target populated in place on assignment.
	Target(Box<dyn Destination + Send>),
}

impl Dynamic {
	/// Held native value, if any.
	pub fn value(&self) -> Option<&Value> {
		match self {
			Dynamic::Value(value) => Some(value),
			_ => None,
		}
	}
}

impl std::fmt::Debug for Dynamic {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Dynamic::Empty => f.write_str("Empty"),
			Dynamic::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Dynamic::Target(_) => f.write_str("Target(..)"),
		}
	}
}

impl DynamicSlot for Dynamic {
	fn pointee(&mut self) -> Option<&mut dyn Destination> {
		match self {
			Dynamic::Target(target) => Some(target.as_mut()),
			_ => None,
		}
	}

	fn replace(&mut self, value: &Value) {
		*self = Dynamic::Value(value.clone());
	}

	fn reset(&mut self) {
		*self = Dynamic::Empty;
	}
}

impl Destination for Dynamic {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Dynamic(self)
	}
}

impl DynamicSlot for Value {
	fn replace(&mut self, value: &Value) {
		self.clone_from(value);
	}
}

impl Destination for Value {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Dynamic(self)
	}
}

impl DynamicSlot for serde_json::Value {
	fn replace(&mut self, value: &Value) {
		*self = value.to_json();
	}
}

impl Destination for serde_json::Value {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Dynamic(self)
	}
}

impl Destination for bool {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Bool(self)
	}
}

impl Destination for String {
	fn slot(&mut self) -> Slot<'_> {
		Slot::String(self)
	}
}

macro_rules! int_destination {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl Destination for $ty {
				fn slot(&mut self) -> Slot<'_> {
					Slot::Int(IntSlot::$variant(self))
				}
			}
		)*
	};
}

int_destination!(
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	isize => Isize,
	u16 => U16,
	u32 => U32,
	u64 => U64,
	usize => Usize,
);

impl Destination for u8 {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Int(IntSlot::U8(self))
	}

	fn from_byte_element(byte: u8) -> Option<Self> {
		Some(byte)
	}
}

impl Destination for f32 {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Float(FloatSlot::F32(self))
	}
}

impl Destination for f64 {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Float(FloatSlot::F64(self))
	}
}

impl Destination for DateTime<Utc> {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Timestamp(self)
	}

	fn leaf_kind() -> Option<LeafKind> {
		Some(LeafKind::Timestamp)
	}
}

impl Destination for LatLng {
	fn slot(&mut self) -> Slot<'_> {
		Slot::GeoPoint(self)
	}

	fn leaf_kind() -> Option<LeafKind> {
		Some(LeafKind::GeoPoint)
	}
}

impl Destination for Uuid {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Uuid(self)
	}

	fn leaf_kind() -> Option<LeafKind> {
		Some(LeafKind::Uuid)
	}
}

impl<T: Destination + Default> ByteBuffer for Vec<T> {
	fn set_bytes(&mut self, bytes: &[u8]) {
		self.clear();
		self.extend(bytes.iter().filter_map(|byte| T::from_byte_element(*byte)));
	}

	fn clear_bytes(&mut self) {
		self.clear();
	}
}

impl<T: Destination + Default> SeqSlot for Vec<T> {
	fn is_growable(&self) -> bool {
		true
	}

	fn len(&self) -> usize {
		Vec::len(self)
	}

	fn resize(&mut self, len: usize) {
		self.resize_with(len, T::default);
	}

	fn reset(&mut self, index: usize) {
		self[index] = T::default();
	}

	fn clear(&mut self) {
		Vec::clear(self);
	}

	fn element(&mut self, index: usize) -> &mut dyn Destination {
		&mut self[index]
	}
}

impl<T: Destination + Default> Destination for Vec<T> {
	fn slot(&mut self) -> Slot<'_> {
		if T::from_byte_element(0).is_some() {
			Slot::Bytes(self)
		} else {
			Slot::Seq(self)
		}
	}

	fn leaf_kind() -> Option<LeafKind> {
		T::from_byte_element(0).map(|_| LeafKind::Bytes)
	}
}

impl<T: Destination + Default, const N: usize> SeqSlot for [T; N] {
	fn is_growable(&self) -> bool {
		false
	}

	fn len(&self) -> usize {
		N
	}

	fn resize(&mut self, _len: usize) {}

	fn reset(&mut self, index: usize) {
		self[index] = T::default();
	}

	fn clear(&mut self) {}

	fn element(&mut self, index: usize) -> &mut dyn Destination {
		&mut self[index]
	}
}

impl<T: Destination + Default, const N: usize> Destination for [T; N] {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Seq(self)
	}
}

impl<V: Destination + Default, S: BuildHasher> MapSlot for HashMap<String, V, S> {
	fn clear(&mut self) {
		HashMap::clear(self);
	}

	fn insert_with(&mut self, key: &str, fill: &mut dyn FnMut(&mut dyn Destination) -> Result<()>) -> Result<()> {
		let mut fresh = V::default();
		fill(&mut fresh)?;
		self.insert(key.to_owned(), fresh);
		Ok(())
	}
}

impl<V: Destination + Default, S: BuildHasher> Destination for HashMap<String, V, S> {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Map(self)
	}
}

impl<V: Destination + Default> MapSlot for BTreeMap<String, V> {
	fn clear(&mut self) {
		BTreeMap::clear(self);
	}

	fn insert_with(&mut self, key: &str, fill: &mut dyn FnMut(&mut dyn Destination) -> Result<()>) -> Result<()> {
		let mut fresh = V::default();
		fill(&mut fresh)?;
		self.insert(key.to_owned(), fresh);
		Ok(())
	}
}

impl<V: Destination + Default> Destination for BTreeMap<String, V> {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Map(self)
	}
}

impl<V: Destination + Default, S: BuildHasher> MapSlot for IndexMap<String, V, S> {
	fn clear(&mut self) {
		IndexMap::clear(self);
	}

	fn insert_with(&mut self, key: &str, fill: &mut dyn FnMut(&mut dyn Destination) -> Result<()>) -> Result<()> {
		let mut fresh = V::default();
		fill(&mut fresh)?;
		self.insert(key.to_owned(), fresh);
		Ok(())
	}
}

impl<V: Destination + Default, S: BuildHasher> Destination for IndexMap<String, V, S> {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Map(self)
	}
}

impl<T: Destination + Default> IndirectSlot for Option<T> {
	fn clear(&mut self) {
		*self = None;
	}

	fn pointee(&mut self) -> &mut dyn Destination {
		self.get_or_insert_with(T::default)
	}
}

impl<T: Destination + Default> Destination for Option<T> {
	fn slot(&mut self) -> Slot<'_> {
		Slot::Indirect(self)
	}
}

impl<T: Destination> Destination for Box<T> {
	fn slot(&mut self) -> Slot<'_> {
		(**self).slot()
	}

	fn leaf_kind() -> Option<LeafKind> {
		T::leaf_kind()
	}
}

#[cfg(test)]
mod tests;
