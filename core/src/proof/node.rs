//! The closed set of proof-tree node shapes.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::hasher::Digest;
use crate::key::DbKey;

/// A node in a proof tree handed to a [`crate::proof::Validator`].
///
/// This is a closed set: adding a variant changes what a validator built
/// against an older version of this crate can recompute, so it is not
/// `#[non_exhaustive]`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProofNode {
    /// Witnesses that the map is empty. Only legal as the whole proof.
    EmptyMapProof,
    /// The requested key's value, witnessed directly at the root (a trie
    /// with a single entry). Only legal as the whole proof.
    EqualValueAtRoot {
        leaf_key: DbKey,
        value_bytes: Vec<u8>,
    },
    /// A single entry at the root that is not the requested key, proving
    /// the map holds exactly one (different) mapping. Only legal as the
    /// whole proof.
    NonEqualValueAtRoot { leaf_key: DbKey, value_hash: Digest },
    /// An absence witness: neither child's prefix covers the requested key,
    /// so the requested key provably has no value below this subtree.
    MappingNotFoundBranch {
        left_hash: Digest,
        right_hash: Digest,
        left_key: DbKey,
        right_key: DbKey,
    },
    /// A branch whose left child is expanded; the right subtree is elided
    /// down to its hash because the requested key cannot be under it.
    LeftBranch {
        left: Box<ProofNode>,
        right_hash: Digest,
        left_key: DbKey,
        right_key: DbKey,
    },
    /// Symmetric to [`ProofNode::LeftBranch`].
    RightBranch {
        left_hash: Digest,
        right: Box<ProofNode>,
        left_key: DbKey,
        right_key: DbKey,
    },
    /// The requested key's value, reached by descending through one or more
    /// branches.
    LeafValueNode { value_bytes: Vec<u8> },
}

impl ProofNode {
    /// Convenience constructor boxing `left` for [`ProofNode::LeftBranch`].
    pub fn left_branch(left: ProofNode, right_hash: Digest, left_key: DbKey, right_key: DbKey) -> Self {
        ProofNode::LeftBranch {
            left: Box::new(left),
            right_hash,
            left_key,
            right_key,
        }
    }

    /// Convenience constructor boxing `right` for [`ProofNode::RightBranch`].
    pub fn right_branch(left_hash: Digest, right: ProofNode, left_key: DbKey, right_key: DbKey) -> Self {
        ProofNode::RightBranch {
            left_hash,
            right: Box::new(right),
            left_key,
            right_key,
        }
    }
}
