//! Various hash functions

use sha2::{Digest, Sha256 as Sha256Hasher};

/// Length in bytes of a SHA-256 digest
pub const SHA256_LENGTH: usize = 32;

/// SHA-256 Hash
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Sha256(pub [u8; SHA256_LENGTH]);

impl AsRef<[u8]> for Sha256 {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

/// Calculate the SHA256 hash
pub fn calculate_sha256(bytes: &[u8]) -> Sha256 {
    let digest = Sha256Hasher::digest(bytes);
    let mut hash = [0; SHA256_LENGTH];
    hash.copy_from_slice(digest.as_slice());

    Sha256(hash)
}
