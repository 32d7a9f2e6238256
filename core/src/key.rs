//! Fixed-width binary keys with a declared significant-bit length.
//!
//! A [`DbKey`] is either a `LEAF` key — always fully significant — or a
//! `BRANCH` key, whose significant prefix is shorter than the full key and
//! stands in for a subtree in the trie (path compression: a branch may skip
//! over a whole chain of single-child internal nodes at once).

use bitvec::prelude::*;
use core::fmt;

/// Number of bytes in a full key.
pub const KEY_SIZE_BYTES: usize = 32;

/// Number of bits in a full key.
pub const KEY_SIZE_BITS: usize = KEY_SIZE_BYTES * 8;

/// The raw byte representation of a full-length key, as addressed by the trie.
pub type KeyBytes = [u8; KEY_SIZE_BYTES];

/// Whether a [`DbKey`] terminates the trie (`Leaf`) or names a subtree (`Branch`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DbKeyKind {
    /// Addresses a single value at a fully-significant key.
    Leaf,
    /// Addresses a subtree; significant for a strict prefix of the full key.
    Branch,
}

/// An immutable, fixed-width binary-radix-trie key.
///
/// Bits beyond `num_significant_bits` are always zero (canonical form); this
/// is checked at construction, not re-checked on every access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbKey {
    kind: DbKeyKind,
    raw_key: KeyBytes,
    num_significant_bits: u16,
}

/// Errors raised when constructing a [`DbKey`] from untrusted byte layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbKeyError {
    /// A `LEAF` key must have `num_significant_bits == KEY_SIZE_BITS`.
    LeafNotFullLength { num_significant_bits: u16 },
    /// A `BRANCH` key must have `num_significant_bits < KEY_SIZE_BITS`.
    BranchAtFullLength,
    /// `num_significant_bits` exceeds `KEY_SIZE_BITS`.
    SignificantBitsOutOfRange { num_significant_bits: u16 },
    /// A bit beyond `num_significant_bits` was set, violating canonical form.
    NonCanonicalTrailingBits,
}

impl fmt::Display for DbKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbKeyError::LeafNotFullLength {
                num_significant_bits,
            } => write!(
                f,
                "leaf DbKey must have {} significant bits, got {}",
                KEY_SIZE_BITS, num_significant_bits
            ),
            DbKeyError::BranchAtFullLength => {
                write!(f, "branch DbKey must have fewer than {} significant bits", KEY_SIZE_BITS)
            }
            DbKeyError::SignificantBitsOutOfRange {
                num_significant_bits,
            } => write!(
                f,
                "num_significant_bits {} exceeds KEY_SIZE_BITS {}",
                num_significant_bits, KEY_SIZE_BITS
            ),
            DbKeyError::NonCanonicalTrailingBits => {
                write!(f, "DbKey has non-zero bits beyond its significant length")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DbKeyError {}

impl DbKey {
    /// Builds a `LEAF` key over a full-length raw key.
    pub fn leaf(raw_key: KeyBytes) -> Result<Self, DbKeyError> {
        Self::new(DbKeyKind::Leaf, raw_key, KEY_SIZE_BITS as u16)
    }

    /// Builds a `BRANCH` key with the given significant-bit length.
    pub fn branch(raw_key: KeyBytes, num_significant_bits: u16) -> Result<Self, DbKeyError> {
        Self::new(DbKeyKind::Branch, raw_key, num_significant_bits)
    }

    fn new(kind: DbKeyKind, raw_key: KeyBytes, num_significant_bits: u16) -> Result<Self, DbKeyError> {
        if num_significant_bits as usize > KEY_SIZE_BITS {
            return Err(DbKeyError::SignificantBitsOutOfRange {
                num_significant_bits,
            });
        }
        match kind {
            DbKeyKind::Leaf if num_significant_bits as usize != KEY_SIZE_BITS => {
                return Err(DbKeyError::LeafNotFullLength {
                    num_significant_bits,
                })
            }
            DbKeyKind::Branch if num_significant_bits as usize == KEY_SIZE_BITS => {
                return Err(DbKeyError::BranchAtFullLength)
            }
            _ => {}
        }

        let bits = raw_key.view_bits::<Msb0>();
        if bits[num_significant_bits as usize..].any() {
            return Err(DbKeyError::NonCanonicalTrailingBits);
        }

        Ok(DbKey {
            kind,
            raw_key,
            num_significant_bits,
        })
    }

    /// This key's kind.
    pub fn kind(&self) -> DbKeyKind {
        self.kind
    }

    /// The full raw key buffer (zero-padded beyond [`DbKey::num_significant_bits`]).
    pub fn raw_key(&self) -> &KeyBytes {
        &self.raw_key
    }

    /// Number of significant bits, starting from the most significant bit of byte 0.
    pub fn num_significant_bits(&self) -> u16 {
        self.num_significant_bits
    }

    /// The significant bits of this key, as a bit slice.
    pub fn significant_bits(&self) -> &BitSlice<u8, Msb0> {
        &self.raw_key.view_bits::<Msb0>()[..self.num_significant_bits as usize]
    }

    /// Returns bit `i`, addressed MSB-of-byte-0 first.
    ///
    /// # Panics
    ///
    /// Panics if `i >= KEY_SIZE_BITS`.
    pub fn bit(&self, i: usize) -> bool {
        self.raw_key.view_bits::<Msb0>()[i]
    }

    /// Length of the longest common bit prefix with `other`, capped by both
    /// keys' significant lengths.
    pub fn common_prefix_length(&self, other: &DbKey) -> usize {
        let cap = core::cmp::min(self.num_significant_bits, other.num_significant_bits) as usize;
        self.significant_bits()[..cap]
            .iter()
            .zip(other.significant_bits()[..cap].iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// True iff this key's significant bits are a prefix of `full_key_bits`.
    pub fn is_prefix_of(&self, full_key_bits: &BitSlice<u8, Msb0>) -> bool {
        let len = self.num_significant_bits as usize;
        len <= full_key_bits.len() && full_key_bits[..len] == *self.significant_bits()
    }

    /// True iff this key's significant bits agree with `path` over `path`'s
    /// whole length (i.e. `path` is the prefix this key was extended from).
    pub fn agrees_with_path(&self, path: &BitSlice<u8, Msb0>) -> bool {
        let len = path.len();
        len <= self.num_significant_bits as usize && self.significant_bits()[..len] == *path
    }

    /// Number of bytes in the canonical encoding fed to the hasher.
    pub const ENCODED_LEN: usize = KEY_SIZE_BYTES + 3;

    /// Canonical byte encoding fed to the injected hasher: the raw key bytes,
    /// a one-byte kind marker, then the significant-bit count as a
    /// little-endian `u16`.
    pub fn canonical_bytes(&self) -> arrayvec::ArrayVec<u8, { DbKey::ENCODED_LEN }> {
        let mut out = arrayvec::ArrayVec::new();
        out.try_extend_from_slice(&self.raw_key).unwrap();
        out.push(match self.kind {
            DbKeyKind::Leaf => 1,
            DbKeyKind::Branch => 0,
        });
        out.try_extend_from_slice(&self.num_significant_bits.to_le_bytes())
            .unwrap();
        out
    }
}
