//! Shared test helpers for workspace crates.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve a fixture path under `<workspace>/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
	workspace_root().join("fixtures").join(name)
}

/// Read raw fixture bytes.
///
/// Panics with the fixture path when the file is missing.
pub fn fixture_bytes(name: &str) -> Vec<u8> {
	let path = fixture_path(name);
	std::fs::read(&path).unwrap_or_else(|err| panic!("fixture {} unreadable: {err}", path.display()))
}

/// Parse a JSON fixture.
pub fn load_json(name: &str) -> Value {
	serde_json::from_slice(&fixture_bytes(name)).unwrap_or_else(|err| panic!("fixture {name} is not valid JSON: {err}"))
}

/// Parse a JSON fixture whose top level must be an object.
pub fn load_json_object(name: &str) -> Map<String, Value> {
	match load_json(name) {
		Value::Object(map) => map,
		other => panic!("fixture {name} must be a JSON object, got {other}"),
	}
}
