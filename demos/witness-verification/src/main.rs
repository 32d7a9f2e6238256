//! Builds a small four-entry map by hand (standing in for a storage engine
//! we don't have in scope), produces witnesses for a few reads against it,
//! and runs them through [`patricia_proof_core`]'s validator.
//!
//! Proof *generation* is out of scope for the core crate (see its crate-level
//! docs): a real caller gets witnesses from the storage engine that holds the
//! map. Here we stand in for that engine ourselves, computing node hashes
//! with the exact same canonical encoding the validator expects, so the
//! witnesses below are exactly what a correct producer would have emitted.

use anyhow::{anyhow, Result};

use patricia_proof_core::hasher::{hash_bytes, Blake3Hasher, Digest, Hasher};
use patricia_proof_core::key::{DbKey, KeyBytes};
use patricia_proof_core::proof::{ProofNode, Validator};

/// Recomputes a leaf node's contribution to its parent's hash, matching the
/// validator's own `H_leaf` exactly.
fn h_leaf(key: &DbKey, value_bytes: &[u8]) -> Digest {
    let value_hash = hash_bytes::<Blake3Hasher>(value_bytes);
    let mut hasher = Blake3Hasher::default();
    hasher.update(&key.canonical_bytes());
    hasher.update(&value_hash);
    hasher.finalize()
}

/// Recomputes a branch node's contribution to its parent's hash, matching
/// the validator's own `H_branch` exactly.
fn h_branch(left_hash: Digest, right_hash: Digest, left_key: &DbKey, right_key: &DbKey) -> Digest {
    let mut hasher = Blake3Hasher::default();
    hasher.update(&left_hash);
    hasher.update(&right_hash);
    hasher.update(&left_key.canonical_bytes());
    hasher.update(&right_key.canonical_bytes());
    hasher.finalize()
}

fn full_key(top_byte: u8) -> KeyBytes {
    let mut raw = [0u8; 32];
    raw[0] = top_byte;
    raw
}

fn branch_key(top_byte: u8, num_significant_bits: u16) -> DbKey {
    DbKey::branch(full_key(top_byte), num_significant_bits).expect("canonical by construction")
}

fn leaf_key(top_byte: u8) -> DbKey {
    DbKey::leaf(full_key(top_byte)).expect("canonical by construction")
}

/// The toy map: four entries splitting evenly on the top two bits of the key.
struct Db {
    alice: (DbKey, &'static [u8]),
    bob: (DbKey, &'static [u8]),
    carol: (DbKey, &'static [u8]),
    dave: (DbKey, &'static [u8]),
    root: Digest,
}

impl Db {
    fn build() -> Self {
        let alice = (leaf_key(0b0000_0000), b"alice".as_slice());
        let bob = (leaf_key(0b0100_0000), b"bob".as_slice());
        let carol = (leaf_key(0b1000_0000), b"carol".as_slice());
        let dave = (leaf_key(0b1100_0000), b"dave".as_slice());

        let left_key = branch_key(0b0000_0000, 1);
        let right_key = branch_key(0b1000_0000, 1);

        let alice_hash = h_leaf(&alice.0, alice.1);
        let bob_hash = h_leaf(&bob.0, bob.1);
        let carol_hash = h_leaf(&carol.0, carol.1);
        let dave_hash = h_leaf(&dave.0, dave.1);

        let left_subtree = h_branch(alice_hash, bob_hash, &alice.0, &bob.0);
        let right_subtree = h_branch(carol_hash, dave_hash, &carol.0, &dave.0);
        let root = h_branch(left_subtree, right_subtree, &left_key, &right_key);

        Db {
            alice,
            bob,
            carol,
            dave,
            root,
        }
    }

    /// A membership witness for `bob`: descends left at the root (bob's
    /// prefix is under the "0" half), then right into the leaf itself.
    fn witness_for_bob(&self) -> ProofNode {
        let left_key = branch_key(0b0000_0000, 1);
        let right_key = branch_key(0b1000_0000, 1);
        let carol_hash = h_leaf(&self.carol.0, self.carol.1);
        let dave_hash = h_leaf(&self.dave.0, self.dave.1);
        let right_subtree_hash = h_branch(carol_hash, dave_hash, &self.carol.0, &self.dave.0);

        let alice_hash = h_leaf(&self.alice.0, self.alice.1);
        let inner_left_key = self.alice.0;
        let inner_right_key = self.bob.0;
        let bob_leaf_node = ProofNode::LeafValueNode {
            value_bytes: self.bob.1.to_vec(),
        };
        let inner = ProofNode::right_branch(alice_hash, bob_leaf_node, inner_left_key, inner_right_key);

        ProofNode::left_branch(inner, right_subtree_hash, left_key, right_key)
    }

    /// An absence witness for "erin" (top byte `0b1110_0000`): her prefix
    /// falls under the "1" half at the root, and under neither `carol` nor
    /// `dave`'s exact key one level down, so the right subtree's own branch
    /// node is a valid `MappingNotFoundBranch`.
    fn witness_for_absent_erin(&self) -> ProofNode {
        let left_key = branch_key(0b0000_0000, 1);
        let right_key = branch_key(0b1000_0000, 1);
        let alice_hash = h_leaf(&self.alice.0, self.alice.1);
        let bob_hash = h_leaf(&self.bob.0, self.bob.1);
        let left_subtree_hash = h_branch(alice_hash, bob_hash, &self.alice.0, &self.bob.0);

        let carol_hash = h_leaf(&self.carol.0, self.carol.1);
        let dave_hash = h_leaf(&self.dave.0, self.dave.1);
        let not_found = ProofNode::MappingNotFoundBranch {
            left_hash: carol_hash,
            right_hash: dave_hash,
            left_key: self.carol.0,
            right_key: self.dave.0,
        };

        ProofNode::right_branch(left_subtree_hash, not_found, left_key, right_key)
    }
}

fn main() -> Result<()> {
    let db = Db::build();
    println!("root = {}", hex::encode(db.root));

    let bob_key = full_key(0b0100_0000);
    let bob_proof = db.witness_for_bob();
    let outcome = Validator::<Blake3Hasher>::new(db.root, bob_key).validate(&bob_proof);
    let value = outcome
        .value()
        .map_err(|e| anyhow!("bob's membership proof did not validate: {e}"))?
        .ok_or_else(|| anyhow!("expected a value for bob, got a non-membership result"))?;
    println!("bob -> {:?} (status={})", String::from_utf8_lossy(value), outcome.status());

    let erin_key = full_key(0b1110_0000);
    let erin_proof = db.witness_for_absent_erin();
    let outcome = Validator::<Blake3Hasher>::new(db.root, erin_key).validate(&erin_proof);
    let value = outcome
        .value()
        .map_err(|e| anyhow!("erin's absence proof did not validate: {e}"))?;
    assert!(value.is_none(), "erin should have no value");
    println!("erin -> absent (status={})", outcome.status());

    // A tampered root is rejected even though the proof shape is fine.
    let mut wrong_root = db.root;
    wrong_root[0] ^= 0xff;
    let outcome = Validator::<Blake3Hasher>::new(wrong_root, bob_key).validate(&db.witness_for_bob());
    assert!(!outcome.is_valid());
    println!(
        "tampered root correctly rejected: {}",
        outcome.value().unwrap_err()
    );

    Ok(())
}
