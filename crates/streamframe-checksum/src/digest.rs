//! Hash-based integrity tails.

use sha2::{Digest, Sha256};

/// SHA-256 output length in bytes.
pub const SHA256_LEN: usize = 32;

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_abc() {
        let digest = sha256(b"abc");
        assert_eq!(digest.len(), SHA256_LEN);
        assert_eq!(&digest[..4], &[0xBA, 0x78, 0x16, 0xBF]);
        assert_eq!(&digest[28..], &[0xF2, 0x00, 0x15, 0xAD]);
    }
}
