//! Public library API for decoding Firestore tagged-union JSON documents.

/// Wire unwrapping, typed assignment, field shapes, and event envelopes.
pub mod firestore;

mod record;
