//! The closed taxonomy of structural outcomes a validation run can reach.

use core::fmt;

/// The structural classification of a completed (or not-yet-run) validation.
///
/// `Status` alone does not mean the proof is valid: [`Status::Valid`] only
/// means the proof tree had a legal shape and hashed up to *some* digest —
/// whether that digest matches the caller's expected root hash is tracked
/// separately, so that a hash mismatch can be told apart from a malformed
/// proof. See the validator's `is_valid()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// No proof has been validated yet.
    NotVisited,
    /// The proof tree was well-formed and hashed without structural error.
    Valid,
    /// A root-level leaf node (`EqualValueAtRoot` / `NonEqualValueAtRoot`)
    /// carried a `DbKey` inconsistent with its own variant or the requested key.
    InvalidDbKeyOfRootNode,
    /// A branch node was entered at the maximum trie depth.
    InvalidBranchNodeDepth,
    /// A branch's child keys, or a leaf's parent key, were inconsistent with
    /// the path taken or the requested key.
    InvalidPathToNode,
    /// An absence witness (`MappingNotFoundProofBranch`) had exactly one
    /// child whose prefix matched the requested key: that subtree was
    /// elided, so the proof cannot rule the key in or out.
    MayContainRequestedValueInSubtrees,
}

impl Status {
    /// The stable, uppercase-snake-case name used in error messages, so
    /// callers (and logs) can pattern-match on rendered text.
    pub fn name(&self) -> &'static str {
        match self {
            Status::NotVisited => "NOT_VISITED",
            Status::Valid => "VALID",
            Status::InvalidDbKeyOfRootNode => "INVALID_DB_KEY_OF_ROOT_NODE",
            Status::InvalidBranchNodeDepth => "INVALID_BRANCH_NODE_DEPTH",
            Status::InvalidPathToNode => "INVALID_PATH_TO_NODE",
            Status::MayContainRequestedValueInSubtrees => "MAY_CONTAIN_REQUESTED_VALUE_IN_SUBTREES",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(Status::Valid.name(), "VALID");
        assert_eq!(
            Status::MayContainRequestedValueInSubtrees.name(),
            "MAY_CONTAIN_REQUESTED_VALUE_IN_SUBTREES"
        );
    }
}
