//! Verification of proofs of membership and non-membership in a persistent
//! Merkle-Patricia map: a binary radix trie keyed by fixed-width hashed keys,
//! with values authenticated by a root hash.
//!
//! This crate verifies proofs; it does not produce them, persist them, or
//! reach into any storage engine. Given an expected root hash, a requested
//! key, and a [`proof::ProofNode`] tree, [`proof::Validator`] determines
//! whether the proof recomputes to the expected root and, if so, whether the
//! requested key has a value (and what it is) or is definitively absent.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod hasher;
pub mod key;
pub mod path;
pub mod proof;
pub mod status;
pub mod value;

pub use hasher::{Digest, Hasher, HASH_SIZE_BYTES, ZERO_DIGEST};
pub use key::{DbKey, DbKeyError, DbKeyKind, KEY_SIZE_BITS, KEY_SIZE_BYTES};
pub use path::TreePath;
pub use proof::{InvalidProofError, ProofNode, ValidationOutcome, Validator};
pub use status::Status;
pub use value::{RawBytes, ValueDecoder};
