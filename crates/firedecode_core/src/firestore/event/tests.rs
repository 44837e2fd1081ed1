use serde_json::json;

use super::{FirestoreCloudEvent, FirestoreDocument, UpdateMask};
use crate::firestore::{FieldPath, FirestoreError, PathStep, Value};

crate::record! {
	#[derive(Debug, Default)]
	struct Counter {
		count: i64,
	}
}

fn event(value: serde_json::Value) -> FirestoreCloudEvent {
	serde_json::from_value(value).expect("event deserializes")
}

#[test]
fn envelope_keys_are_camel_case_and_optional() {
	let parsed = event(json!({
		"value": {
			"name": "projects/p/databases/(default)/documents/counters/c1",
			"fields": { "count": { "integerValue": "3" } },
			"updateTime": "2025-04-14T01:02:03Z",
		},
		"updateMask": { "fieldPaths": ["count"] },
	}));

	assert_eq!(parsed.document().id(), "c1");
	assert!(parsed.document().create_time.is_none());
	assert!(parsed.document().update_time.is_some());
	assert!(parsed.old_document().is_none());
	assert_eq!(parsed.update_mask, UpdateMask { field_paths: vec!["count".into()] });
}

#[test]
fn data_to_decodes_new_and_old_snapshots() {
	let parsed = event(json!({
		"oldValue": { "name": "counters/c1", "fields": { "count": { "integerValue": "2" } } },
		"value": { "name": "counters/c1", "fields": { "count": { "integerValue": "3" } } },
	}));

	let mut current = Counter::default();
	parsed.data_to(&mut current).expect("new snapshot decodes");
	assert_eq!(current.count, 3);

	let mut previous = Counter::default();
	parsed.old_data_to(&mut previous).expect("old snapshot decodes");
	assert_eq!(previous.count, 2);

	let map = parsed.to_map().expect("map decodes");
	assert_eq!(map.get("count"), Some(&Value::Integer(3)));
}

#[test]
fn missing_fields_are_reported() {
	let document = FirestoreDocument {
		name: "counters/gone".into(),
		..FirestoreDocument::default()
	};
	let err = document.to_map().expect_err("no fields");
	assert!(matches!(err, FirestoreError::MissingFields { ref name } if name == "counters/gone"), "{err}");

	let deleted = event(json!({ "oldValue": { "name": "counters/gone", "fields": {} } }));
	let mut counter = Counter::default();
	assert!(deleted.data_to(&mut counter).is_err());
	assert!(deleted.old_document().is_some());
}

#[test]
fn changed_fields_parse_update_mask_paths() {
	let parsed = event(json!({ "updateMask": { "fieldPaths": ["count", "meta.`last-seen`"] } }));
	let paths = parsed.changed_fields().expect("paths parse");
	assert_eq!(paths[0], FieldPath { steps: vec![PathStep::Key("count".into())] });
	assert_eq!(
		paths[1],
		FieldPath {
			steps: vec![PathStep::Key("meta".into()), PathStep::Key("last-seen".into())]
		}
	);

	let bad = event(json!({ "updateMask": { "fieldPaths": ["a..b"] } }));
	assert!(matches!(bad.changed_fields(), Err(FirestoreError::InvalidFieldPath { .. })));
}

#[test]
fn fixture_event_parses_from_bytes() {
	let bytes = firedecode_testkit::fixture_bytes("cloud_event.json");
	let parsed = FirestoreCloudEvent::from_slice(&bytes).expect("fixture parses");
	assert_eq!(parsed.document().id(), "o-100");
	assert!(parsed.old_document().is_none());
	assert!(parsed.changed_fields().expect("empty mask").is_empty());

	let err = FirestoreCloudEvent::from_slice(b"{not json").expect_err("invalid json");
	assert!(matches!(err, FirestoreError::Json(_)), "{err}");
}
