//! The injected mapping from proof-carried value bytes to a caller's value type.
//!
//! The validator never interprets value bytes itself beyond hashing them;
//! producing the typed value a caller ultimately wants back is delegated to
//! a [`ValueDecoder`], in the same way the storage engine this crate split
//! out of treats a value's byte encoding as an external concern.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Maps the raw bytes carried by a proof's leaf to a caller-chosen value type.
pub trait ValueDecoder {
    /// The value type produced for a proven membership.
    type Value;

    /// Decodes `bytes` — the exact bytes a leaf carried in the proof — into
    /// a [`ValueDecoder::Value`].
    fn decode(bytes: &[u8]) -> Self::Value;
}

/// A [`ValueDecoder`] that hands back the leaf bytes unchanged.
///
/// Useful when the caller wants to defer interpretation of the value, or in
/// tests where the value's structure is irrelevant.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBytes;

impl ValueDecoder for RawBytes {
    type Value = Vec<u8>;

    fn decode(bytes: &[u8]) -> Self::Value {
        bytes.to_vec()
    }
}
