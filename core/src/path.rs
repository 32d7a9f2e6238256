//! The bit-path cursor threaded through a validation descent.

use crate::key::{DbKey, KEY_SIZE_BITS, KEY_SIZE_BYTES};
use bitvec::prelude::*;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// The bit-path from the trie root to the node currently being validated.
///
/// A path only ever grows during a descent and shrinks back to a prior
/// length when a descent unwinds (mirroring the recursive call stack); it
/// never grows past [`KEY_SIZE_BITS`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreePath {
    bits: BitVec<u8, Msb0>,
}

impl TreePath {
    /// An empty path, positioned at the trie root.
    pub fn new() -> Self {
        TreePath {
            bits: BitVec::new(),
        }
    }

    /// Number of bits accumulated so far.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True iff no bits have been accumulated (i.e. we are at the root).
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Appends a `0` bit.
    pub fn go_left(&mut self) {
        self.bits.push(false);
    }

    /// Appends a `1` bit.
    pub fn go_right(&mut self) {
        self.bits.push(true);
    }

    /// The accumulated bits, as a slice.
    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    /// Truncates the path back to `new_len` bits, undoing the extension made
    /// while descending into a child that has since returned.
    ///
    /// # Panics
    ///
    /// Panics if `new_len > self.len()`.
    pub fn truncate(&mut self, new_len: usize) {
        assert!(new_len <= self.bits.len(), "cannot extend via truncate");
        self.bits.truncate(new_len);
    }

    /// Appends every bit of `key` beyond the path's current length, up to
    /// `key`'s significant length. Returns the number of bits appended, for
    /// a matching [`TreePath::truncate`] once the descent unwinds.
    pub fn extend_with_key(&mut self, key: &DbKey) -> usize {
        let start = self.len();
        let end = key.num_significant_bits() as usize;
        for i in start..end {
            if key.bit(i) {
                self.go_right();
            } else {
                self.go_left();
            }
        }
        end - start
    }

    /// Packs the accumulated bits into a fixed-size, zero-padded byte array
    /// using the same MSB-first-per-byte layout as [`DbKey`]'s raw key.
    pub fn to_byte_array(&self) -> [u8; KEY_SIZE_BYTES] {
        let mut out = [0u8; KEY_SIZE_BYTES];
        out.view_bits_mut::<Msb0>()[..self.bits.len()].copy_from_bitslice(&self.bits);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::DbKeyKind;

    #[test]
    fn go_left_and_right_append_bits() {
        let mut path = TreePath::new();
        path.go_left();
        path.go_right();
        path.go_right();
        assert_eq!(path.len(), 3);
        assert_eq!(path.bits().iter().map(|b| *b).collect::<Vec<_>>(), vec![false, true, true]);
    }

    #[test]
    fn truncate_restores_prior_length() {
        let mut path = TreePath::new();
        path.go_left();
        path.go_right();
        let saved = path.len();
        path.go_right();
        path.go_left();
        path.truncate(saved);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn extend_with_key_appends_remaining_significant_bits() {
        let mut raw = [0u8; KEY_SIZE_BYTES];
        raw.view_bits_mut::<Msb0>().set(0, true);
        raw.view_bits_mut::<Msb0>().set(1, true);
        raw.view_bits_mut::<Msb0>().set(2, false);
        raw.view_bits_mut::<Msb0>().set(3, true);
        let key = DbKey::branch(raw, 4).unwrap();
        let _ = DbKeyKind::Branch;

        let mut path = TreePath::new();
        path.go_left();
        let appended = path.extend_with_key(&key);
        assert_eq!(appended, 3);
        assert_eq!(path.len(), 4);
        assert_eq!(path.bits()[1], true);
        assert_eq!(path.bits()[2], false);
        assert_eq!(path.bits()[3], true);
    }

    #[test]
    fn to_byte_array_matches_dbkey_layout() {
        let mut raw = [0u8; KEY_SIZE_BYTES];
        raw[0] = 0b1011_0000;
        let key = DbKey::branch(raw, 4).unwrap();

        let mut path = TreePath::new();
        path.extend_with_key(&key);
        assert_eq!(path.to_byte_array(), raw);
    }
}
