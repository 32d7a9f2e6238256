//! The streaming hash primitive injected into the validator.
//!
//! The validator never picks a hash function itself: every place the
//! specification says "feed bytes to a fresh hasher, in order, then
//! finalize" is expressed here as a single [`Hasher`] type parameter,
//! exactly the way the storage engine this crate was split out of injects
//! its own node hasher as a generic rather than a runtime trait object.

/// Size, in bytes, of a digest produced by the injected hash function.
pub const HASH_SIZE_BYTES: usize = 32;

/// A fixed-size digest produced by the injected [`Hasher`].
pub type Digest = [u8; HASH_SIZE_BYTES];

/// The all-zero digest, used as the hash of the empty map.
pub const ZERO_DIGEST: Digest = [0u8; HASH_SIZE_BYTES];

/// A streaming hash function producing a fixed-size digest.
///
/// Implementors are fed bytes in a specific order via repeated [`Hasher::update`]
/// calls and must finalize deterministically over exactly those bytes, in
/// that order, with no padding beyond what the underlying primitive itself
/// applies. A fresh instance is created per node hashed; no state survives
/// past a single [`Hasher::finalize`].
pub trait Hasher: Default {
    /// Feed more bytes into the hasher.
    fn update(&mut self, bytes: &[u8]);

    /// Consume the hasher and produce its digest.
    fn finalize(self) -> Digest;
}

/// Hashes a single byte slice in isolation with a fresh hasher.
pub fn hash_bytes<H: Hasher>(bytes: &[u8]) -> Digest {
    let mut hasher = H::default();
    hasher.update(bytes);
    hasher.finalize()
}

#[cfg(feature = "blake3-hasher")]
mod blake3_impl {
    use super::{Digest, Hasher};

    /// [`Hasher`] backed by BLAKE3.
    #[derive(Default)]
    pub struct Blake3Hasher(blake3::Hasher);

    impl Hasher for Blake3Hasher {
        fn update(&mut self, bytes: &[u8]) {
            self.0.update(bytes);
        }

        fn finalize(self) -> Digest {
            *self.0.finalize().as_bytes()
        }
    }
}

#[cfg(feature = "blake3-hasher")]
pub use blake3_impl::Blake3Hasher;

#[cfg(feature = "sha2-hasher")]
mod sha2_impl {
    use super::{Digest, Hasher};
    use sha2::Digest as _;

    /// [`Hasher`] backed by SHA-256.
    #[derive(Default)]
    pub struct Sha256Hasher(sha2::Sha256);

    impl Hasher for Sha256Hasher {
        fn update(&mut self, bytes: &[u8]) {
            sha2::Digest::update(&mut self.0, bytes);
        }

        fn finalize(self) -> Digest {
            self.0.finalize().into()
        }
    }
}

#[cfg(feature = "sha2-hasher")]
pub use sha2_impl::Sha256Hasher;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "blake3-hasher")]
    #[test]
    fn blake3_matches_reference() {
        let got = hash_bytes::<Blake3Hasher>(b"hello");
        let want = blake3::hash(b"hello");
        assert_eq!(&got, want.as_bytes());
    }

    #[cfg(feature = "sha2-hasher")]
    #[test]
    fn sha256_matches_reference() {
        use sha2::Digest as _;
        let got = hash_bytes::<Sha256Hasher>(b"hello");
        let want = sha2::Sha256::digest(b"hello");
        assert_eq!(&got[..], &want[..]);
    }

    #[cfg(feature = "blake3-hasher")]
    #[test]
    fn distinct_inputs_distinct_digests() {
        assert_ne!(
            hash_bytes::<Blake3Hasher>(b"a"),
            hash_bytes::<Blake3Hasher>(b"b")
        );
    }
}
