use std::fmt;

use crate::firestore::{FirestoreError, Map, Result, Value};

/// One operation in a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a named map entry or record field.
	Key(String),
	/// Select an array element by zero-based index.
	Index(usize),
}

/// Field path into a value tree.
///
/// Renders as Firestore field-path syntax: dotted keys, backtick-quoted when a
/// key is not a plain identifier, with `[index]` selectors for arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
	/// Ordered sequence of path steps.
	pub steps: Vec<PathStep>,
}

impl FieldPath {
	/// Empty path addressing the document itself.
	pub fn root() -> Self {
		Self::default()
	}

	/// True when no steps have been pushed.
	pub fn is_root(&self) -> bool {
		self.steps.is_empty()
	}

	/// Append a key step.
	pub fn push_key(&mut self, key: &str) {
		self.steps.push(PathStep::Key(key.to_owned()));
	}

	/// Append an index step.
	pub fn push_index(&mut self, index: usize) {
		self.steps.push(PathStep::Index(index));
	}

	/// Drop the last step.
	pub fn pop(&mut self) {
		self.steps.pop();
	}

	/// Parse dotted field-path syntax with backtick-quoted keys and optional `[index]` selectors.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = || FirestoreError::InvalidFieldPath { path: input.to_owned() };
		if input.is_empty() {
			return Err(invalid());
		}

		let bytes = input.as_bytes();
		let mut idx = 0_usize;
		let mut steps = Vec::new();

		while idx < bytes.len() {
			if bytes[idx] == b'`' {
				idx += 1;
				let mut key = String::new();
				loop {
					let Some(ch) = input[idx..].chars().next() else {
						return Err(invalid());
					};
					idx += ch.len_utf8();
					match ch {
						'`' => break,
						'\\' => {
							let Some(escaped) = input[idx..].chars().next() else {
								return Err(invalid());
							};
							idx += escaped.len_utf8();
							key.push(escaped);
						}
						_ => key.push(ch),
					}
				}
				if key.is_empty() {
					return Err(invalid());
				}
				steps.push(PathStep::Key(key));
			} else {
				let start = idx;
				while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
					idx += 1;
				}
				if idx == start {
					return Err(invalid());
				}
				steps.push(PathStep::Key(input[start..idx].to_owned()));
			}

			while idx < bytes.len() && bytes[idx] == b'[' {
				idx += 1;
				let n_start = idx;
				while idx < bytes.len() && bytes[idx].is_ascii_digit() {
					idx += 1;
				}
				if idx == n_start || idx >= bytes.len() || bytes[idx] != b']' {
					return Err(invalid());
				}

				let number = input[n_start..idx].parse::<usize>().map_err(|_| invalid())?;
				steps.push(PathStep::Index(number));
				idx += 1;
			}

			if idx < bytes.len() {
				if bytes[idx] != b'.' {
					return Err(invalid());
				}
				idx += 1;
				if idx >= bytes.len() {
					return Err(invalid());
				}
			}
		}

		Ok(Self { steps })
	}

	/// Follow the path through a native map.
	pub fn lookup<'v>(&self, map: &'v Map) -> Option<&'v Value> {
		let (first, rest) = self.steps.split_first()?;
		let PathStep::Key(key) = first else {
			return None;
		};
		let mut current = map.get(key)?;
		for step in rest {
			current = match (step, current) {
				(PathStep::Key(key), Value::Map(entries)) => entries.get(key)?,
				(PathStep::Index(index), Value::Array(items)) => items.get(*index)?,
				_ => return None,
			};
		}
		Some(current)
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.steps.is_empty() {
			return f.write_str("<root>");
		}
		for (position, step) in self.steps.iter().enumerate() {
			match step {
				PathStep::Key(key) => {
					if position > 0 {
						f.write_str(".")?;
					}
					write_key(f, key)?;
				}
				PathStep::Index(index) => write!(f, "[{index}]")?,
			}
		}
		Ok(())
	}
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
	if is_simple_key(key) {
		return f.write_str(key);
	}
	f.write_str("`")?;
	for ch in key.chars() {
		if ch == '`' || ch == '\\' {
			f.write_str("\\")?;
		}
		write!(f, "{ch}")?;
	}
	f.write_str("`")
}

fn is_simple_key(key: &str) -> bool {
	let mut chars = key.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' => chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_'),
		_ => false,
	}
}
