/// Runtime limits shared by unwrapping and assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
	/// Maximum container nesting depth; the document itself sits at depth 0.
	pub max_depth: u32,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self { max_depth: 64 }
	}
}

impl DecodeOptions {
	/// Options without a nesting limit, bounded only by the call stack.
	pub fn unbounded() -> Self {
		Self { max_depth: u32::MAX }
	}

	/// Override the nesting limit.
	pub fn with_max_depth(self, max_depth: u32) -> Self {
		Self { max_depth }
	}
}
