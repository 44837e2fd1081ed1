use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Destination, Dynamic, DynamicSlot, FloatSlot, IntSlot, LeafKind, Slot};
use crate::firestore::{LatLng, Value};

#[test]
fn byte_vectors_are_leaves_and_other_vectors_are_sequences() {
	let mut bytes: Vec<u8> = vec![1, 2];
	assert!(matches!(bytes.slot(), Slot::Bytes(_)));
	assert_eq!(<Vec<u8>>::leaf_kind(), Some(LeafKind::Bytes));

	let mut words: Vec<u16> = Vec::new();
	assert!(matches!(words.slot(), Slot::Seq(_)));
	assert_eq!(<Vec<u16>>::leaf_kind(), None);
}

#[test]
fn leaf_types_report_their_kind() {
	assert_eq!(<DateTime<Utc>>::leaf_kind(), Some(LeafKind::Timestamp));
	assert_eq!(LatLng::leaf_kind(), Some(LeafKind::GeoPoint));
	assert_eq!(Uuid::leaf_kind(), Some(LeafKind::Uuid));
	assert_eq!(<Box<Uuid>>::leaf_kind(), Some(LeafKind::Uuid));
	assert_eq!(String::leaf_kind(), None);
}

#[test]
fn byte_buffer_replaces_contents() {
	let mut bytes: Vec<u8> = vec![9, 9, 9];
	let Slot::Bytes(buffer) = bytes.slot() else {
		panic!("expected a byte slot");
	};
	buffer.set_bytes(b"ab");
	assert_eq!(bytes, b"ab".to_vec());
}

#[test]
fn int_slot_rejects_out_of_range_values() {
	let mut small: i8 = 1;
	let mut slot = IntSlot::I8(&mut small);
	assert!(!slot.store(300));
	assert!(slot.store(-100));
	assert_eq!(small, -100);

	let mut unsigned: u32 = 5;
	assert!(!IntSlot::U32(&mut unsigned).store(-1));
	assert_eq!(unsigned, 5);
}

#[test]
fn float_slot_rejects_values_beyond_f32() {
	let mut narrow: f32 = 0.0;
	assert!(!FloatSlot::F32(&mut narrow).store(1e300));
	assert!(FloatSlot::F32(&mut narrow).store(f64::INFINITY));
	assert!(narrow.is_infinite());
	assert!(FloatSlot::F32(&mut narrow).store(2.5));
	assert_eq!(narrow, 2.5);
}

#[test]
fn fixed_arrays_are_not_growable() {
	let mut fixed = [0_i32; 3];
	let Slot::Seq(seq) = fixed.slot() else {
		panic!("expected a sequence slot");
	};
	assert!(!seq.is_growable());
	assert_eq!(seq.len(), 3);
	seq.resize(10);
	assert_eq!(seq.len(), 3);
}

#[test]
fn map_insert_replaces_existing_entries() {
	let mut map: HashMap<String, Vec<String>> = HashMap::new();
	map.insert("k".into(), vec!["old".into(), "stale".into()]);

	let Slot::Map(slot) = map.slot() else {
		panic!("expected a map slot");
	};
	slot.insert_with("k", &mut |dest| {
		let Slot::Seq(seq) = dest.slot() else {
			panic!("expected a sequence slot");
		};
		assert_eq!(seq.len(), 0, "inserted values start fresh");
		seq.resize(1);
		Ok(())
	})
	.expect("insert succeeds");

	assert_eq!(map["k"], vec![String::new()]);
}

#[test]
fn option_pointee_allocates_default() {
	let mut maybe: Option<u16> = None;
	let Slot::Indirect(slot) = maybe.slot() else {
		panic!("expected an indirect slot");
	};
	assert!(matches!(slot.pointee().slot(), Slot::Int(IntSlot::U16(_))));
	assert_eq!(maybe, Some(0));
}

#[test]
fn dynamic_forwards_to_its_target() {
	let mut open = Dynamic::Target(Box::new(0_i64));
	assert!(open.pointee().is_some());

	let mut empty = Dynamic::default();
	assert!(empty.pointee().is_none());
	empty.replace(&Value::Bool(true));
	assert_eq!(empty.value(), Some(&Value::Bool(true)));
}

#[test]
fn slot_kind_names_describe_the_destination() {
	let mut flag = false;
	let mut ratio = 0.0_f64;
	let mut when = DateTime::<Utc>::UNIX_EPOCH;
	assert_eq!(flag.slot().kind_name(), "bool");
	assert_eq!(ratio.slot().kind_name(), "f64");
	assert_eq!(when.slot().kind_name(), "timestamp");
	assert_eq!(Slot::Unsupported("Custom").kind_name(), "Custom");
}

#[test]
fn json_values_are_replaced_with_converted_values() {
	let mut open = serde_json::json!({ "stale": true });
	let Slot::Dynamic(slot) = open.slot() else {
		panic!("expected a dynamic slot");
	};
	slot.replace(&Value::Integer(3));
	assert_eq!(open, serde_json::json!(3));
}
