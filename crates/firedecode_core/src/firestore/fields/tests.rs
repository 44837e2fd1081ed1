use std::any::TypeId;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{FieldCache, FieldDecl, RecordShape, TagOptions, parse_tag};
use crate::firestore::{Destination, FirestoreError, LeafKind, Map, RecordSlot, Value};

#[test]
fn tag_parsing_covers_names_options_and_skip() {
	assert_eq!(parse_tag("-"), Ok(None));
	assert_eq!(parse_tag("total"), Ok(Some(("total", TagOptions::default()))));
	assert_eq!(parse_tag(",omitempty"), Ok(Some(("", TagOptions { omit_empty: true }))));
	assert_eq!(parse_tag("total,omitempty"), Ok(Some(("total", TagOptions { omit_empty: true }))));

	let err = parse_tag("total,inline").expect_err("unknown option");
	assert!(err.contains("inline"), "{err}");
}

#[test]
fn build_applies_tags_and_skips() {
	let decls = [
		FieldDecl::new("id"),
		FieldDecl::new("display_name").with_tag("displayName"),
		FieldDecl::new("secret").with_tag("-"),
		FieldDecl::new("created").with_tag(",omitempty").with_leaf(Some(LeafKind::Timestamp)),
	];
	let shape = RecordShape::build("Profile", &decls).expect("shape builds");

	let names: Vec<_> = shape.fields.iter().map(|field| field.external_name.as_str()).collect();
	assert_eq!(names, vec!["id", "displayName", "created"]);
	assert_eq!(shape.fields[2].index, 3, "indexes follow declaration order");
	assert!(shape.fields[2].omit_empty);
	assert_eq!(shape.fields[2].leaf, Some(LeafKind::Timestamp));
}

#[test]
fn build_rejects_bad_tags_and_duplicates() {
	let err = RecordShape::build("Bad", &[FieldDecl::new("a").with_tag("a,nope")]).expect_err("bad option");
	assert!(matches!(err, FirestoreError::InvalidTag { record: "Bad", field: "a", .. }), "{err}");

	let err = RecordShape::build("Dup", &[FieldDecl::new("a"), FieldDecl::new("b").with_tag("a")]).expect_err("duplicate");
	assert!(matches!(err, FirestoreError::InvalidTag { field: "b", .. }), "{err}");
}

#[test]
fn find_prefers_exact_names() {
	let shape = RecordShape::build("Pair", &[FieldDecl::new("Name"), FieldDecl::new("name")]).expect("shape builds");
	assert_eq!(shape.find("name").map(|field| field.index), Some(1));
	assert_eq!(shape.find("Name").map(|field| field.index), Some(0));
	assert_eq!(shape.find("NAME").map(|field| field.index), Some(0), "first case-insensitive match");
	assert!(shape.find("other").is_none());
}

#[test]
fn match_keys_lets_exact_keys_win_regardless_of_order() {
	let shape = RecordShape::build("Person", &[FieldDecl::new("name"), FieldDecl::new("age")]).expect("shape builds");

	let mut entries = Map::new();
	entries.insert("Name".into(), Value::String("upper".into()));
	entries.insert("age".into(), Value::Integer(3));
	entries.insert("name".into(), Value::String("lower".into()));
	entries.insert("extra".into(), Value::Null);

	let matches = shape.match_keys(&entries);
	assert_eq!(matches.len(), 2);
	assert_eq!(matches[0].field.name, "name");
	assert_eq!(matches[0].key, "name");
	assert!(matches[0].exact);
	assert_eq!(matches[0].value, &Value::String("lower".into()));
	assert_eq!(matches[1].field.name, "age");
}

#[test]
fn match_keys_binds_case_insensitive_keys() {
	let shape = RecordShape::build("Person", &[FieldDecl::new("name")]).expect("shape builds");
	let mut entries = Map::new();
	entries.insert("NAME".into(), Value::String("x".into()));

	let matches = shape.match_keys(&entries);
	assert_eq!(matches.len(), 1);
	assert!(!matches[0].exact);
}

static DECLARED: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Counted {
	value: i64,
}

impl RecordSlot for Counted {
	fn record_type(&self) -> TypeId {
		TypeId::of::<Self>()
	}

	fn record_name(&self) -> &'static str {
		"Counted"
	}

	fn declared_fields(&self) -> Vec<FieldDecl> {
		DECLARED.fetch_add(1, Ordering::SeqCst);
		vec![FieldDecl::new("value")]
	}

	fn field(&mut self, index: usize) -> Option<&mut dyn Destination> {
		match index {
			0 => Some(&mut self.value),
			_ => None,
		}
	}
}

#[test]
fn cache_resolves_each_type_once_across_threads() {
	let cache = FieldCache::new();
	assert!(cache.is_empty());

	let shapes: Vec<_> = std::thread::scope(|scope| {
		let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| cache.resolve(&Counted::default()).expect("resolves"))).collect();
		handles.into_iter().map(|handle| handle.join().expect("thread finished")).collect()
	});

	assert_eq!(DECLARED.load(Ordering::SeqCst), 1);
	assert_eq!(cache.len(), 1);
	assert!(shapes.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));

	cache.clear();
	assert!(cache.is_empty());
}

#[test]
fn global_cache_is_shared() {
	assert!(std::ptr::eq(FieldCache::global(), FieldCache::global()));
}
