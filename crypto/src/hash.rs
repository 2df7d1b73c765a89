//! Blake2b hashing for receipt identities and script hashes.

use blake2::digest::consts::{U28, U32};
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;
type Blake2b224 = Blake2b<U28>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute a 224-bit Blake2b hash, the width of policy ids and script hashes.
pub fn blake2b_224(data: &[u8]) -> [u8; 28] {
    blake2b_224_multi(&[data])
}

/// 224-bit variant of [`blake2b_256_multi`].
pub fn blake2b_224_multi(parts: &[&[u8]]) -> [u8; 28] {
    let mut hasher = Blake2b224::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 28];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_deterministic() {
        let h1 = blake2b_256(b"hello agora");
        let h2 = blake2b_256(b"hello agora");
        assert_eq!(h1, h2);
    }

    #[test]
    fn blake2b_different_inputs() {
        assert_ne!(blake2b_256(b"hello"), blake2b_256(b"world"));
    }

    #[test]
    fn blake2b_256_known_vector() {
        // Blake2b-256 of the empty string.
        assert_eq!(
            hex_of(&blake2b_256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn blake2b_multi_equivalent() {
        assert_eq!(
            blake2b_256(b"helloworld"),
            blake2b_256_multi(&[b"hello", b"world"])
        );
        assert_eq!(
            blake2b_224(b"helloworld"),
            blake2b_224_multi(&[b"hello", b"world"])
        );
    }

    #[test]
    fn widths_are_independent() {
        // Blake2b parameterises the output length, so the 224-bit digest is
        // not a prefix of the 256-bit one.
        let long = blake2b_256(b"script");
        let short = blake2b_224(b"script");
        assert_ne!(&long[..28], &short[..]);
    }

    fn hex_of(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
